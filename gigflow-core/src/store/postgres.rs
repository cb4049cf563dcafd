//! PostgreSQL-backed implementation of the store ports.
//!
//! Every status write is a conditional `UPDATE`, so the database decides
//! races. The hire transition runs in a single transaction whose first
//! statement is the compare-and-set on the gig row; a caller that loses that
//! statement never reaches the bid writes.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::info;

use gigflow_model::{Bid, BidId, Gig, GigId, User, UserId};

use super::{HireCommit, IdentityStore, MarketStore};
use crate::error::{MarketError, Result};

const GIG_COLUMNS: &str = "id, owner_id, title, description, budget, status, created_at";
const BID_COLUMNS: &str = "id, gig_id, responder_id, price, message, status, created_at";

/// Upper bound on the hire transaction. A CAS waiting on a wedged competing
/// transaction fails within this window instead of blocking indefinitely;
/// the caller gets a retryable [`MarketError::Storage`].
const HIRE_TX_TIMEOUT: &str = "SET LOCAL lock_timeout = '5s'; SET LOCAL statement_timeout = '5s'";

/// PostgreSQL-backed store.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MarketError::storage_with_source("failed to run migrations", e))?;
        info!("database migrations applied");
        Ok(())
    }
}

fn gig_from_row(row: &PgRow) -> Result<Gig> {
    let status: String = row
        .try_get("status")
        .map_err(|e| MarketError::storage_with_source("failed to read gig row", e))?;
    Ok(Gig {
        id: GigId(read(row, "id")?),
        owner_id: UserId(read(row, "owner_id")?),
        title: read(row, "title")?,
        description: read(row, "description")?,
        budget: read(row, "budget")?,
        status: status.parse().map_err(MarketError::storage)?,
        created_at: read(row, "created_at")?,
    })
}

fn bid_from_row(row: &PgRow) -> Result<Bid> {
    let status: String = row
        .try_get("status")
        .map_err(|e| MarketError::storage_with_source("failed to read bid row", e))?;
    Ok(Bid {
        id: BidId(read(row, "id")?),
        gig_id: GigId(read(row, "gig_id")?),
        responder_id: UserId(read(row, "responder_id")?),
        price: read(row, "price")?,
        message: read(row, "message")?,
        status: status.parse().map_err(MarketError::storage)?,
        created_at: read(row, "created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId(read(row, "id")?),
        name: read(row, "name")?,
        email: read(row, "email")?,
        created_at: read(row, "created_at")?,
    })
}

fn read<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| MarketError::storage_with_source(format!("failed to read column {column}"), e))
}

fn query_err(context: &str) -> impl FnOnce(sqlx::Error) -> MarketError + '_ {
    move |e| MarketError::storage_with_source(format!("failed to {context}"), e)
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.constraint() == Some(constraint))
}

#[async_trait]
impl MarketStore for PostgresStore {
    async fn get_gig(&self, gig_id: GigId) -> Result<Option<Gig>> {
        let row = sqlx::query(&format!("SELECT {GIG_COLUMNS} FROM gigs WHERE id = $1"))
            .bind(gig_id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("get gig"))?;
        row.as_ref().map(gig_from_row).transpose()
    }

    async fn get_bid(&self, bid_id: BidId) -> Result<Option<Bid>> {
        let row = sqlx::query(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id = $1"))
            .bind(bid_id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("get bid"))?;
        row.as_ref().map(bid_from_row).transpose()
    }

    async fn list_open_gigs(&self, search: Option<&str>) -> Result<Vec<Gig>> {
        let rows = sqlx::query(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs \
             WHERE status = 'open' \
               AND ($1::text IS NULL \
                    OR title ILIKE '%' || $1 || '%' \
                    OR description ILIKE '%' || $1 || '%') \
             ORDER BY created_at DESC"
        ))
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("list open gigs"))?;
        rows.iter().map(gig_from_row).collect()
    }

    async fn list_bids_for_gig(&self, gig_id: GigId) -> Result<Vec<Bid>> {
        let rows = sqlx::query(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE gig_id = $1 ORDER BY created_at DESC"
        ))
        .bind(gig_id.to_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("list bids"))?;
        rows.iter().map(bid_from_row).collect()
    }

    async fn find_bid_by_responder(
        &self,
        gig_id: GigId,
        responder_id: UserId,
    ) -> Result<Option<Bid>> {
        let row = sqlx::query(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE gig_id = $1 AND responder_id = $2"
        ))
        .bind(gig_id.to_uuid())
        .bind(responder_id.to_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err("find bid by responder"))?;
        row.as_ref().map(bid_from_row).transpose()
    }

    async fn insert_gig(&self, gig: &Gig) -> Result<()> {
        sqlx::query(
            "INSERT INTO gigs (id, owner_id, title, description, budget, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(gig.id.to_uuid())
        .bind(gig.owner_id.to_uuid())
        .bind(&gig.title)
        .bind(&gig.description)
        .bind(gig.budget)
        .bind(gig.status.as_str())
        .bind(gig.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert gig"))?;
        Ok(())
    }

    async fn insert_bid(&self, bid: &Bid) -> Result<()> {
        // Conditional insert: commits only while the gig is still open, so a
        // bid can never be created against an assigned gig. FOR SHARE blocks
        // against a concurrent hire's status UPDATE; once that commits the
        // re-evaluated predicate sees the assigned gig and inserts nothing.
        let result = sqlx::query(
            "INSERT INTO bids (id, gig_id, responder_id, price, message, status, created_at) \
             SELECT $1, $2, $3, $4, $5, $6, $7 \
             WHERE EXISTS (SELECT 1 FROM gigs WHERE id = $2 AND status = 'open' FOR SHARE)",
        )
        .bind(bid.id.to_uuid())
        .bind(bid.gig_id.to_uuid())
        .bind(bid.responder_id.to_uuid())
        .bind(bid.price)
        .bind(&bid.message)
        .bind(bid.status.as_str())
        .bind(bid.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "bids_gig_id_responder_id_key") {
                MarketError::DuplicateBid
            } else {
                MarketError::storage_with_source("failed to insert bid", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return match self.get_gig(bid.gig_id).await? {
                None => Err(MarketError::GigNotFound { gig_id: bid.gig_id }),
                Some(_) => Err(MarketError::GigClosed),
            };
        }
        Ok(())
    }

    async fn commit_hire(&self, gig_id: GigId, bid_id: BidId) -> Result<HireCommit> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_err("start hire transaction"))?;

        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(HIRE_TX_TIMEOUT))
            .await
            .map_err(query_err("bound hire transaction"))?;

        // The race-arbitration point. Zero rows means another transaction
        // assigned the gig first (or it never existed).
        let gig_row = sqlx::query(&format!(
            "UPDATE gigs SET status = 'assigned' \
             WHERE id = $1 AND status = 'open' \
             RETURNING {GIG_COLUMNS}"
        ))
        .bind(gig_id.to_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_err("assign gig"))?;

        let Some(gig_row) = gig_row else {
            tx.rollback()
                .await
                .map_err(query_err("abort hire transaction"))?;
            return match self.get_gig(gig_id).await? {
                None => Err(MarketError::GigNotFound { gig_id }),
                Some(_) => Err(MarketError::TransactionConflict),
            };
        };
        let gig = gig_from_row(&gig_row)?;

        let hired_row = sqlx::query(&format!(
            "UPDATE bids SET status = 'hired' \
             WHERE id = $1 AND gig_id = $2 AND status = 'pending' \
             RETURNING {BID_COLUMNS}"
        ))
        .bind(bid_id.to_uuid())
        .bind(gig_id.to_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_err("hire bid"))?;

        let Some(hired_row) = hired_row else {
            // The target bid was decided (or removed) under us. Abort so the
            // gig stays open; the caller's decision never took effect.
            tx.rollback()
                .await
                .map_err(query_err("abort hire transaction"))?;
            return match self.get_bid(bid_id).await? {
                None => Err(MarketError::BidNotFound { bid_id }),
                Some(_) => Err(MarketError::BidNotPending),
            };
        };
        let hired = bid_from_row(&hired_row)?;

        let rejected_rows = sqlx::query(&format!(
            "UPDATE bids SET status = 'rejected' \
             WHERE gig_id = $1 AND id <> $2 AND status = 'pending' \
             RETURNING {BID_COLUMNS}"
        ))
        .bind(gig_id.to_uuid())
        .bind(bid_id.to_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_err("reject losing bids"))?;
        let rejected = rejected_rows
            .iter()
            .map(bid_from_row)
            .collect::<Result<Vec<_>>>()?;

        tx.commit()
            .await
            .map_err(query_err("commit hire transaction"))?;

        info!(
            gig_id = %gig_id,
            hired_bid = %bid_id,
            rejected = rejected.len(),
            "hire committed"
        );
        Ok(HireCommit {
            gig,
            hired,
            rejected,
        })
    }

    async fn reject_bid(&self, bid_id: BidId) -> Result<Bid> {
        // Single conditional statement re-checking both preconditions at
        // write time, so a reject racing a concurrent hire cannot mutate a
        // bid of an assigned gig.
        let row = sqlx::query(&format!(
            "UPDATE bids SET status = 'rejected' \
             WHERE id = $1 AND status = 'pending' \
               AND EXISTS (SELECT 1 FROM gigs WHERE gigs.id = bids.gig_id AND gigs.status = 'open') \
             RETURNING {BID_COLUMNS}"
        ))
        .bind(bid_id.to_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err("reject bid"))?;

        match row {
            Some(row) => bid_from_row(&row),
            None => {
                let Some(bid) = self.get_bid(bid_id).await? else {
                    return Err(MarketError::BidNotFound { bid_id });
                };
                let gig_open = self
                    .get_gig(bid.gig_id)
                    .await?
                    .is_some_and(|gig| gig.is_open());
                if !gig_open {
                    Err(MarketError::GigClosed)
                } else {
                    Err(MarketError::BidNotPending)
                }
            }
        }
    }
}

#[async_trait]
impl IdentityStore for PostgresStore {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id.to_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_lower_key") {
                MarketError::Conflict("email already registered".into())
            } else {
                MarketError::storage_with_source("failed to insert user", e)
            }
        })?;
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = $1")
            .bind(user_id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("get user"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err("get user by email"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_password_hash(&self, user_id: UserId) -> Result<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id.to_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_err("get password hash"))?;
        Ok(hash)
    }
}
