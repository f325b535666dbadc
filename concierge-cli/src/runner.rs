//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, config loading and construction of
//! the library collaborators so command handlers stay small.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use concierge::config::{ConfigFile, ProviderKind};
use concierge::dashboard::Dashboard;
use concierge::focus::FocusNotifier;
use concierge::generation::{ChatCompletionsModel, GenerativeModel, ScriptedModel};
use concierge::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use concierge::profile::{load_feed, load_profile, RecommendationFeed, UserProfile};
use concierge::provider::{CatalogLookup, NominatimLookup, PlaceLookup, ReqwestClient};
use tracing::info;

use crate::error::CliError;

/// Characters per replayed chunk of a scripted itinerary.
const SCRIPT_CHUNK_CHARS: usize = 24;

/// Pause between replayed chunks, so progress is visible.
const SCRIPT_CHUNK_DELAY: Duration = Duration::from_millis(40);

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
    offline: bool,
}

impl CliRunner {
    /// Load config and initialize logging.
    pub fn new(config_path: Option<PathBuf>, offline: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(ConfigFile::default_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
            offline,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Concierge v{}", env!("CARGO_PKG_VERSION"));
        info!(
            config = %self.config_path.display(),
            offline = self.offline,
            "Concierge CLI: {} command",
            command
        );
    }

    /// Place lookup for the configured provider; the catalog when offline.
    pub fn lookup(&self) -> Result<Arc<dyn PlaceLookup>, CliError> {
        if self.offline || self.config.search.provider == ProviderKind::Catalog {
            return Ok(Arc::new(CatalogLookup::blacksburg()));
        }
        let client = ReqwestClient::new().map_err(CliError::Lookup)?;
        Ok(Arc::new(NominatimLookup::with_base_url(
            client,
            self.config.search.nominatim_url.clone(),
        )))
    }

    /// Generative model: a replayed script, or the configured endpoint.
    pub fn model(&self, script: Option<&Path>) -> Result<Arc<dyn GenerativeModel>, CliError> {
        if let Some(path) = script {
            let document = read_file(path)?;
            info!(script = %path.display(), "Replaying scripted itinerary");
            let model = ScriptedModel::from_document(&document, SCRIPT_CHUNK_CHARS)
                .with_delay(SCRIPT_CHUNK_DELAY);
            return Ok(Arc::new(model));
        }
        if self.offline {
            return Err(CliError::Config(
                "offline itinerary generation needs --script <file>".to_string(),
            ));
        }

        let generation = &self.config.generation;
        let api_key = generation.api_key();
        if api_key.is_none() {
            info!(env = %generation.api_key_env, "No API key set; sending unauthenticated requests");
        }
        let model = ChatCompletionsModel::new(
            generation.endpoint.clone(),
            generation.model.clone(),
            api_key,
            generation.timeout(),
        )
        .map_err(CliError::Model)?;
        Ok(Arc::new(model))
    }

    /// Dashboard without a map attached.
    pub fn dashboard(&self, model: Arc<dyn GenerativeModel>) -> Result<Dashboard, CliError> {
        Ok(Dashboard::new(
            &self.config,
            self.lookup()?,
            model,
            FocusNotifier::detached(),
        ))
    }

    /// Dashboard for commands that never generate.
    pub fn dashboard_without_model(&self) -> Result<Dashboard, CliError> {
        self.dashboard(Arc::new(ScriptedModel::new(Vec::<String>::new())))
    }

    /// Guest profile from `path`, falling back to the configured file.
    pub fn profile(&self, path: Option<&Path>) -> Option<UserProfile> {
        path.or(self.config.data.profile_path.as_deref())
            .and_then(load_profile)
    }

    /// Recommendation feed from `path`, falling back to the configured file.
    pub fn feed(&self, path: Option<&Path>) -> Option<RecommendationFeed> {
        path.or(self.config.data.feed_path.as_deref())
            .and_then(load_feed)
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.display().to_string(),
        error,
    })
}
