//! FHIR options and per-request configuration resolution

use fhirgate_engine::FhirVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreResult;

/// Prefix of environment variables read by [`FhirOptions::load`]
pub const ENV_PREFIX: &str = "FHIRGATE";

/// Process-wide FHIR options, read once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FhirOptions {
    /// Default FHIR version; compared case-insensitively
    #[serde(default)]
    pub version: FhirVersion,

    /// Not consulted by the services
    #[serde(default = "default_true")]
    pub validate_on_parse: bool,

    /// Not consulted by the services
    #[serde(default)]
    pub server_base_url: Option<String>,

    /// Read but not enforced by the services; transports may apply it
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Strict parsing for every request
    #[serde(default)]
    pub strict_validation: bool,
}

impl Default for FhirOptions {
    fn default() -> Self {
        Self {
            version: FhirVersion::default(),
            validate_on_parse: default_true(),
            server_base_url: None,
            timeout_seconds: default_timeout_seconds(),
            strict_validation: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Layout of the configuration sources: options live under `fhir`
#[derive(Debug, Default, Serialize, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    fhir: FhirOptions,
}

impl FhirOptions {
    /// Load from defaults, an optional file, then `FHIRGATE_FHIR__*` variables
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&OptionsFile::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let file: OptionsFile = builder.build()?.try_deserialize()?;
        tracing::debug!(
            version = %file.fhir.version,
            strict = file.fhir.strict_validation,
            "FHIR options loaded"
        );
        Ok(file.fhir)
    }

    /// Defaults every request starts from
    pub fn effective_defaults(&self) -> EffectiveConfig {
        EffectiveConfig {
            version: self.version,
            strict: self.strict_validation,
        }
    }
}

/// Version and strictness in force for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectiveConfig {
    pub version: FhirVersion,
    pub strict: bool,
}

/// Per-request overrides; an absent field keeps the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigOverride {
    pub version: Option<FhirVersion>,
    pub strict: Option<bool>,
}

pub fn resolve(defaults: EffectiveConfig, overrides: ConfigOverride) -> EffectiveConfig {
    EffectiveConfig {
        version: overrides.version.unwrap_or(defaults.version),
        strict: overrides.strict.unwrap_or(defaults.strict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_override_wins_when_present() {
        let defaults = EffectiveConfig {
            version: FhirVersion::R4,
            strict: false,
        };

        assert_eq!(resolve(defaults, ConfigOverride::default()), defaults);
        assert_eq!(
            resolve(
                defaults,
                ConfigOverride {
                    version: Some(FhirVersion::R5),
                    strict: None,
                }
            ),
            EffectiveConfig {
                version: FhirVersion::R5,
                strict: false,
            }
        );
        assert!(
            resolve(
                defaults,
                ConfigOverride {
                    version: None,
                    strict: Some(true),
                }
            )
            .strict
        );
    }

    #[test]
    fn test_load_from_file_is_case_insensitive() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "fhir:\n  version: r5\n  strict_validation: true").unwrap();

        let options = FhirOptions::load(Some(file.path())).unwrap();
        assert_eq!(options.version, FhirVersion::R5);
        assert!(options.strict_validation);
        assert_eq!(options.timeout_seconds, 30);
        assert_eq!(
            options.effective_defaults(),
            EffectiveConfig {
                version: FhirVersion::R5,
                strict: true,
            }
        );
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"fhir": {{"version": "STU3"}}}}"#).unwrap();
        assert!(FhirOptions::load(Some(file.path())).is_err());
    }
}
