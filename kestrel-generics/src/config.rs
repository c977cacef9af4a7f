//! Resolver configuration
//!
//! Read from the `[generics]` table of a compiler settings file, e.g.
//!
//! ```toml
//! [generics]
//! max_expansion_depth = 64
//! reject_open_arguments = false
//! ```

use crate::error::ConfigError;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenericsConfig {
    /// How deep nested instantiation requests may chain before `RecursiveInstantiation`
    pub max_expansion_depth: usize,
    /// Reject type arguments that still mention generic parameters
    pub reject_open_arguments: bool,
    /// Compare declared parameter kinds against argument kinds
    pub check_kinds: bool,
}

impl Default for GenericsConfig {
    fn default() -> Self {
        Self {
            max_expansion_depth: 128,
            reject_open_arguments: true,
            check_kinds: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    generics: GenericsConfig,
}

impl GenericsConfig {
    /// Parse the `[generics]` table of a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: SettingsFile = toml::from_str(source)?;
        Ok(settings.generics)
    }
}
