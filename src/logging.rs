use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("LOKI_ENABLED is true but LOKI_URL is not set")]
    MissingLokiUrl,

    #[error("invalid LOKI_URL {url:?}: {source}")]
    LokiUrl { url: String, source: url::ParseError },

    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to build the Loki layer: {0}")]
    Loki(String),

    #[error(transparent)]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Where log lines go and how they are labelled.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            loki_enabled: lookup("LOKI_ENABLED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
            loki_url: lookup("LOKI_URL").filter(|v| !v.trim().is_empty()),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "stockdash".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.log_level).map_err(|source| LoggingError::Filter {
            filter: self.log_level.clone(),
            source,
        })
    }

    /// The Loki push endpoint, or `None` when shipping to Loki is switched off.
    fn loki_endpoint(&self) -> Result<Option<Url>, LoggingError> {
        if !self.loki_enabled {
            return Ok(None);
        }

        let raw = self.loki_url.as_deref().ok_or(LoggingError::MissingLokiUrl)?;
        Url::parse(raw).map(Some).map_err(|source| LoggingError::LokiUrl {
            url: raw.to_string(),
            source,
        })
    }
}

/// Installs the global subscriber: `fmt` to stdout, plus a Loki layer when
/// enabled and compiled in. Fails if a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;
    let endpoint = config.loki_endpoint()?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match endpoint {
        #[cfg(feature = "loki")]
        Some(url) => {
            registry.with(loki_layer(config, url.clone())?).try_init()?;
            tracing::info!(
                loki_url = %url,
                service = %config.service_name,
                environment = %config.environment,
                "📊 Logging to console and Loki"
            );
        }
        #[cfg(not(feature = "loki"))]
        Some(url) => {
            registry.try_init()?;
            tracing::warn!(loki_url = %url, "LOKI_ENABLED is set but this build has no loki feature");
        }
        None => {
            registry.try_init()?;
            tracing::info!(level = %config.log_level, "📊 Console logging initialized");
        }
    }

    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig, url: Url) -> Result<tracing_loki::Layer, LoggingError> {
    let (layer, task) = tracing_loki::builder()
        .label("service", config.service_name.as_str())
        .and_then(|b| b.label("environment", config.environment.as_str()))
        .and_then(|b| b.build_url(url))
        .map_err(|e| LoggingError::Loki(e.to_string()))?;

    // Ships batches in the background for the life of the process
    tokio::spawn(task);
    Ok(layer)
}
