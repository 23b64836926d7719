//! stockagent - Stock Market AI Agent API
//!
//! Serves `GET /stock?ticker=...`: fetches the latest close for the ticker and
//! asks a chat-completion model for a BUY/HOLD/SELL recommendation.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use stockagent::models::{AppConfig, Credentials};
//! use stockagent::agents::Orchestrator;
//! use stockagent::{build_orchestrator, router};
//! ```

pub use stockagent_agents as agents;
pub use stockagent_models as models;

pub mod lifespan;
pub mod server;

pub use lifespan::Lifespan;
pub use server::{router, serve};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stockagent_agents::{
    HttpTransport, OpenRouterRecommender, Orchestrator, ReqwestTransport, YahooPriceProvider,
};
use stockagent_models::{AppConfig, ConfigError, Credentials};
use tracing::debug;

pub const SERVICE_NAME: &str = "Stock Market AI Agent API";

/// Load configuration from a TOML file, or defaults when no path is given.
pub fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let config_str =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&config_str).with_context(|| format!("Failed to parse config: {path}"))
}

/// Load variables from an env file into the process environment.
///
/// Without a path, `.env` is searched from the working directory upwards and
/// its absence is not an error. Variables already set in the environment are
/// never overridden.
pub fn load_dotenv(path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file: {}", path.display()))?;
            path.to_path_buf()
        }
        None => match dotenvy::dotenv() {
            Ok(path) => path,
            Err(e) if e.not_found() => return Ok(None),
            Err(e) => return Err(e).context("Failed to load .env"),
        },
    };
    debug!(path = %loaded.display(), "Loaded environment file");
    Ok(Some(loaded))
}

/// Resolve the provider credential and build the production Orchestrator.
///
/// Fails with `ConfigError::MissingCredential` when `lookup` has no value for
/// `recommendation.api_key_env`; nothing is built or bound in that case.
pub fn build_service<F>(config: &AppConfig, lookup: F) -> Result<Orchestrator, ConfigError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(&config.recommendation.api_key_env, lookup)?;
    Ok(build_orchestrator(config, credentials))
}

/// Build an Orchestrator talking to the real providers over reqwest.
pub fn build_orchestrator(config: &AppConfig, credentials: Credentials) -> Orchestrator {
    let price_transport = Arc::new(ReqwestTransport::new(
        config.market_data.timeout_seconds.map(Duration::from_secs),
    ));
    let chat_transport = Arc::new(ReqwestTransport::new(
        config.recommendation.timeout_seconds.map(Duration::from_secs),
    ));
    build_orchestrator_with(config, credentials, price_transport, chat_transport)
}

/// Build an Orchestrator over caller-supplied transports.
pub fn build_orchestrator_with(
    config: &AppConfig,
    credentials: Credentials,
    price_transport: Arc<dyn HttpTransport>,
    chat_transport: Arc<dyn HttpTransport>,
) -> Orchestrator {
    let prices = YahooPriceProvider::new(price_transport, config.market_data.clone());
    let recommender =
        OpenRouterRecommender::new(chat_transport, credentials, config.recommendation.clone());
    Orchestrator::new(Arc::new(prices), Arc::new(recommender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_config_path_means_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn loads_config_file() {
        let path = std::env::temp_dir().join(format!("stockagent-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 9001\n\n[recommendation]\nstrict_response = true\n")
            .unwrap();

        let config = load_config(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 9001);
        assert!(config.recommendation.strict_response);
    }

    #[test]
    fn missing_or_broken_config_file_is_an_error() {
        let err = load_config(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));

        let path = std::env::temp_dir().join(format!("stockagent-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = load_config(path.to_str()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn service_refuses_to_build_without_credential() {
        let mut config = AppConfig::default();
        config.recommendation.api_key_env = "STOCKAGENT_TEST_KEY".to_string();

        let mut asked = None;
        let err = build_service(&config, |name| {
            asked = Some(name.to_string());
            None
        })
        .err()
        .unwrap();

        assert_eq!(asked.as_deref(), Some("STOCKAGENT_TEST_KEY"));
        assert!(matches!(err, ConfigError::MissingCredential(ref v) if v == "STOCKAGENT_TEST_KEY"));

        let blank = build_service(&AppConfig::default(), |_| Some(String::new()));
        assert!(matches!(blank, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn service_builds_with_credential() {
        let service = build_service(&AppConfig::default(), |name| {
            assert_eq!(name, "OPENROUTER_API_KEY");
            Some("sk-or-startup".to_string())
        });
        assert!(service.is_ok());
    }

    #[test]
    fn env_file_fills_gaps_without_overriding_real_environment() {
        let suffix = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        let from_file = format!("STOCKAGENT_FILE_ONLY_{suffix}");
        let preset = format!("STOCKAGENT_PRESET_{suffix}");
        std::env::set_var(&preset, "from-process");

        let path = std::env::temp_dir().join(format!("stockagent-{suffix}.env"));
        std::fs::write(&path, format!("{from_file}=sk-from-file\n{preset}=from-file\n")).unwrap();

        let loaded = load_dotenv(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(std::env::var(&from_file).unwrap(), "sk-from-file");
        assert_eq!(std::env::var(&preset).unwrap(), "from-process");

        let creds = Credentials::from_lookup(&from_file, |name| std::env::var(name).ok()).unwrap();
        assert_eq!(creds.api_key(), "sk-from-file");
    }

    #[test]
    fn explicit_env_file_must_exist() {
        let err = load_dotenv(Some(Path::new("/definitely/not/here.env"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load env file"));
    }
}
