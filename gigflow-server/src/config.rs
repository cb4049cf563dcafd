//! Runtime configuration, sourced from CLI flags and environment.

use clap::Parser;

/// CLI entry point.
#[derive(Parser, Debug, Clone)]
#[command(name = "gigflow-server")]
#[command(about = "Gig marketplace hiring engine with real-time bid notifications")]
pub struct Config {
    /// Server host
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 5000)]
    pub port: u16,

    /// PostgreSQL connection URL. When absent the server runs against the
    /// in-memory store and all state is lost on shutdown.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Secret for signing session tokens
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Allowed CORS origin. Absent means permissive (dev default).
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        let config = Config::try_parse_from(["gigflow-server", "--jwt-secret", "s"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "gigflow-server",
            "--jwt-secret",
            "s",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
