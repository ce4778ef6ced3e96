use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use progress_core::model::StatusPolicy;

use crate::error::ConfigError;

/// Where namespace records are persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local map; nothing survives a restart.
    #[default]
    Memory,
    /// One JSON file per namespace inside `dir`.
    File { dir: PathBuf },
    /// `SQLite` database at `url`.
    Sqlite { url: String },
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub backend: BackendConfig,
    pub status_policy: StatusPolicy,
    /// Reject writes against ids missing from the attached catalog.
    pub strict_ids: bool,
}

impl EngineConfig {
    /// Reads `LMS_BACKEND`, `LMS_DB_URL`, `LMS_STATE_DIR`,
    /// `LMS_STATUS_POLICY` and `LMS_STRICT_IDS` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`], reading from any key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is unsupported or a backend is
    /// missing its location.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("LMS_BACKEND").as_deref().map(str::trim) {
            None | Some("" | "memory") => BackendConfig::Memory,
            Some("file") => {
                let dir = lookup("LMS_STATE_DIR").ok_or(ConfigError::MissingValue {
                    key: "LMS_STATE_DIR",
                    backend: "file",
                })?;
                BackendConfig::File {
                    dir: PathBuf::from(dir),
                }
            }
            Some("sqlite") => {
                let url = lookup("LMS_DB_URL").unwrap_or_else(|| "sqlite://progress.sqlite3".into());
                BackendConfig::Sqlite {
                    url: normalize_sqlite_url(&url),
                }
            }
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_owned())),
        };

        let status_policy = match lookup("LMS_STATUS_POLICY").as_deref().map(str::trim) {
            None | Some("" | "monotonic") => StatusPolicy::Monotonic,
            Some("legacy") => StatusPolicy::Legacy,
            Some(other) => return Err(ConfigError::UnknownStatusPolicy(other.to_owned())),
        };

        let strict_ids = match lookup("LMS_STRICT_IDS") {
            None => false,
            Some(raw) => parse_bool("LMS_STRICT_IDS", &raw)?,
        };

        Ok(Self {
            backend,
            status_policy,
            strict_ids,
        })
    }

    /// Parses a JSON config document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the document is not a valid config.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            raw: raw.to_owned(),
        }),
    }
}

/// Accepts bare paths and `sqlite:` shorthands, producing a URL that creates
/// the database file when missing.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_owned();
    }
    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    if path.contains('?') {
        format!("sqlite://{path}")
    } else {
        format!("sqlite://{path}?mode=rwc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.status_policy, StatusPolicy::Monotonic);
        assert!(!config.strict_ids);
    }

    #[test]
    fn sqlite_backend_normalizes_url() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("LMS_BACKEND", "sqlite"),
            ("LMS_DB_URL", "sqlite:data/progress.db"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                url: "sqlite://data/progress.db?mode=rwc".into()
            }
        );
    }

    #[test]
    fn sqlite_memory_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:db?mode=memory&cache=shared"),
            "sqlite:file:db?mode=memory&cache=shared"
        );
        assert_eq!(normalize_sqlite_url("/tmp/p.db"), "sqlite:///tmp/p.db?mode=rwc");
    }

    #[test]
    fn file_backend_requires_dir() {
        let err = EngineConfig::from_lookup(lookup(&[("LMS_BACKEND", "file")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingValue {
                key: "LMS_STATE_DIR",
                backend: "file"
            }
        );
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            EngineConfig::from_lookup(lookup(&[("LMS_BACKEND", "redis")])),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(matches!(
            EngineConfig::from_lookup(lookup(&[("LMS_STATUS_POLICY", "strict")])),
            Err(ConfigError::UnknownStatusPolicy(_))
        ));
        assert!(matches!(
            EngineConfig::from_lookup(lookup(&[("LMS_STRICT_IDS", "maybe")])),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn legacy_policy_and_strict_ids_from_env() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("LMS_STATUS_POLICY", "legacy"),
            ("LMS_STRICT_IDS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.status_policy, StatusPolicy::Legacy);
        assert!(config.strict_ids);
    }

    #[test]
    fn json_config_fills_defaults() {
        let config =
            EngineConfig::from_json(r#"{"backend": {"kind": "file", "dir": "/var/lms"}}"#).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::File {
                dir: PathBuf::from("/var/lms")
            }
        );
        assert_eq!(config.status_policy, StatusPolicy::Monotonic);
    }
}
