//! Kiosk configuration.
//!
//! Configuration lives in an INI file (default `<config dir>/concierge/concierge.ini`).
//! Every key is optional; missing keys fall back to [`ConfigFile::default`].
//!
//! ```ignore
//! use concierge::config::ConfigFile;
//!
//! let config = ConfigFile::load_from(&ConfigFile::default_path())?;
//! let region = config.search_region();
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::ConfigFileError;
pub use settings::{
    ConfigFile, DataSettings, DistanceSettings, GenerationSettings, LocationSettings,
    ProviderKind, SearchSettings, DEFAULT_API_KEY_ENV, DEFAULT_GENERATION_TIMEOUT_SECS,
    DEFAULT_GUEST, DEFAULT_HOTEL, DEFAULT_SEARCH_RADIUS_METERS,
};
