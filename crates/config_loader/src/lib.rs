//! # Config Loader
//!
//! Layered sync configuration.
//!
//! A `SyncConfig` is assembled in three layers, each one only replacing the
//! fields it names:
//! 1. built-in defaults (the rig constants)
//! 2. an optional TOML/JSON file, merged section by section
//! 3. overrides from `BIKE_SYNC__<SECTION>__<FIELD>` variables and
//!    `section.field=value` assignments
//!
//! The merged result is validated once, at the end.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, ConfigOverrides};
//! use std::path::Path;
//!
//! let mut overrides = ConfigOverrides::from_env().unwrap();
//! overrides.set("search.tau_max_s=0.4").unwrap();
//! let config = ConfigLoader::load_layered(Some(Path::new("sync.toml")), &overrides).unwrap();
//! println!("cutoff: {} Hz", config.filter.cutoff_hz);
//! ```

mod overrides;
mod parser;
mod validator;

pub use contracts::SyncConfig;
pub use overrides::{ConfigOverrides, ENV_PREFIX};
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then `path` if given, then `overrides`; validated.
    ///
    /// # Errors
    /// - File read failure or unsupported extension
    /// - Parse or type failure
    /// - Unknown section or field, in the file or in an override
    /// - Validation failure
    pub fn load_layered(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<SyncConfig, ContractError> {
        let document = match path {
            Some(path) => {
                let format = Self::detect_format(path)?;
                Some((std::fs::read_to_string(path)?, format))
            }
            None => None,
        };
        let document = document
            .as_ref()
            .map(|(content, format)| (content.as_str(), *format));
        Self::assemble(document, overrides)
    }

    /// Load a configuration file on top of the defaults
    pub fn load_from_path(path: &Path) -> Result<SyncConfig, ContractError> {
        Self::load_layered(Some(path), &ConfigOverrides::new())
    }

    /// Load configuration text on top of the defaults
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<SyncConfig, ContractError> {
        Self::assemble(Some((content, format)), &ConfigOverrides::new())
    }

    /// Serialize SyncConfig to TOML string
    pub fn to_toml(config: &SyncConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize SyncConfig to JSON string
    pub fn to_json(config: &SyncConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn assemble(
        document: Option<(&str, ConfigFormat)>,
        overrides: &ConfigOverrides,
    ) -> Result<SyncConfig, ContractError> {
        let mut tree = parser::defaults()?;
        if let Some((content, format)) = document {
            let layer = parser::parse_document(content, format)?;
            parser::check_known(&tree, &layer)?;
            parser::merge_sections(&mut tree, layer);
        }
        overrides.apply(&mut tree)?;

        let config = parser::into_config(tree)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
