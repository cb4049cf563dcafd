//! Shared application state handed to every handler.

use std::sync::Arc;

use gigflow_core::{BidIntake, BidRejection, HiringOrchestrator, Store};

use crate::auth::AuthKeys;
use crate::hub::NotificationHub;

/// Everything the HTTP and WebSocket layers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hub: Arc<NotificationHub>,
    pub auth: Arc<AuthKeys>,
    pub intake: Arc<BidIntake>,
    pub orchestrator: Arc<HiringOrchestrator>,
    pub rejection: Arc<BidRejection>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the hiring services against a concrete store and the broadcast
    /// hub. Generic so both the Postgres store and the in-memory test store
    /// coerce without dynamic upcasting.
    pub fn new<S>(store: Arc<S>, hub: Arc<NotificationHub>, auth: AuthKeys) -> Self
    where
        S: Store + 'static,
    {
        let intake = Arc::new(BidIntake::new(store.clone()));
        let orchestrator = Arc::new(HiringOrchestrator::new(store.clone(), hub.clone()));
        let rejection = Arc::new(BidRejection::new(store.clone(), hub.clone()));

        Self {
            store,
            hub,
            auth: Arc::new(auth),
            intake,
            orchestrator,
            rejection,
        }
    }
}
