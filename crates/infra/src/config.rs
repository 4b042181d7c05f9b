//! Environment-driven configuration.
//!
//! | variable | default |
//! |---|---|
//! | `HOLDBOOK_BIND` | `0.0.0.0:8080` |
//! | `HOLDBOOK_CREDENTIALS_JSON` / `HOLDBOOK_CREDENTIALS_FILE` | none (empty registry) |
//! | `HOLDBOOK_MAX_LOGIN_ATTEMPTS` | `3` |
//! | `HOLDBOOK_REMEMBER_TTL_HOURS` | `24` |
//! | `HOLDBOOK_REMEMBER_MODE` | `verified` |
//! | `HOLDBOOK_SESSION_IDLE_MINUTES` | `720` |
//! | `HOLDBOOK_TABLE` | `Finance_DB` |
//! | `HOLDBOOK_LEDGER_SHEET` / `HOLDBOOK_REPORT_SHEET` | `data` / `report` |
//! | `HOLDBOOK_REPORT_PERIOD` | unset: fixed-cell report layout |
//! | `HOLDBOOK_STORE` | `memory` |
//! | `DATABASE_URL` | required for `postgres` |

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use holdbook_auth::{
    Capability, CapabilityPolicy, CapabilitySet, CredentialRegistry, GatePolicy, Identity,
    RememberMode,
};

use crate::report::ReportLayout;
use crate::table_store::TableRef;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error("failed to read credentials file '{path}': {source}")]
    CredentialsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials document: {0}")]
    CredentialsParse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

/// Credential document: `{"passwords": {...}, "capabilities": {...}}`.
#[derive(Deserialize)]
struct CredentialDocument {
    #[serde(default)]
    passwords: HashMap<String, String>,
    #[serde(default)]
    capabilities: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub registry: Arc<CredentialRegistry>,
    pub capabilities: CapabilityPolicy,
    pub gate: GatePolicy,
    pub session_idle: Duration,
    pub ledger_sheet: TableRef,
    pub report_sheet: TableRef,
    pub report_layout: ReportLayout,
    pub store: StoreBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = parse_or(&get, "HOLDBOOK_BIND", || SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let document = match (get("HOLDBOOK_CREDENTIALS_JSON"), get("HOLDBOOK_CREDENTIALS_FILE")) {
            (Some(json), _) => Some(json),
            (None, Some(path)) => Some(
                std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::CredentialsFile { path, source })?,
            ),
            (None, None) => None,
        };
        let (registry, capabilities) = match document {
            Some(json) => parse_credentials(&json)?,
            None => {
                warn!("no credentials configured; nobody will be able to log in");
                (CredentialRegistry::default(), CapabilityPolicy::default())
            }
        };

        let max_attempts: u32 = parse_or(&get, "HOLDBOOK_MAX_LOGIN_ATTEMPTS", || 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnv {
                var: "HOLDBOOK_MAX_LOGIN_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }
        let remember_ttl_hours: u32 = parse_or(&get, "HOLDBOOK_REMEMBER_TTL_HOURS", || 24)?;
        let remember_mode = match get("HOLDBOOK_REMEMBER_MODE") {
            Some(raw) => raw.parse::<RememberMode>().map_err(|e| ConfigError::InvalidEnv {
                var: "HOLDBOOK_REMEMBER_MODE",
                reason: e.message().to_string(),
            })?,
            None => RememberMode::default(),
        };
        let idle_minutes: u32 = parse_or(&get, "HOLDBOOK_SESSION_IDLE_MINUTES", || 720)?;

        let table = get("HOLDBOOK_TABLE").unwrap_or_else(|| "Finance_DB".to_string());
        let ledger_sheet = get("HOLDBOOK_LEDGER_SHEET").unwrap_or_else(|| "data".to_string());
        let report_sheet = get("HOLDBOOK_REPORT_SHEET").unwrap_or_else(|| "report".to_string());
        let report_layout = match get("HOLDBOOK_REPORT_PERIOD") {
            Some(period) => ReportLayout::labeled(period.trim()),
            None => ReportLayout::default(),
        };

        let store = match get("HOLDBOOK_STORE").as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::InvalidEnv {
                    var: "HOLDBOOK_STORE",
                    reason: format!("unknown store '{other}' (expected memory|postgres)"),
                });
            }
        };

        Ok(Self {
            bind,
            registry: Arc::new(registry),
            capabilities,
            gate: GatePolicy {
                max_attempts,
                remember_ttl: Duration::hours(i64::from(remember_ttl_hours)),
                remember_mode,
            },
            session_idle: Duration::minutes(i64::from(idle_minutes)),
            ledger_sheet: TableRef::new(table.clone(), ledger_sheet),
            report_sheet: TableRef::new(table, report_sheet),
            report_layout,
            store,
        })
    }
}

fn parse_or<T, G, D>(get: &G, var: &'static str, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match get(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default()),
    }
}

/// Parse the credential document into a registry and a capability policy.
///
/// Identities listed under `capabilities` replace the default grant; all
/// others keep the admin/writer split.
pub fn parse_credentials(
    json: &str,
) -> Result<(CredentialRegistry, CapabilityPolicy), ConfigError> {
    let document: CredentialDocument = serde_json::from_str(json)?;

    let mut policy = CapabilityPolicy::default();
    for (identity, names) in document.capabilities {
        let set = names
            .iter()
            .map(|name| name.parse::<Capability>())
            .collect::<Result<CapabilitySet, _>>()
            .map_err(|e| ConfigError::InvalidEnv {
                var: "HOLDBOOK_CREDENTIALS",
                reason: format!("capabilities of '{identity}': {}", e.message()),
            })?;
        policy = policy.grant(Identity::new(identity), set);
    }

    Ok((CredentialRegistry::new(document.passwords), policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdbook_auth::Credentials;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(cfg.registry.is_empty());
        assert_eq!(cfg.gate, GatePolicy::default());
        assert_eq!(cfg.session_idle, Duration::minutes(720));
        assert_eq!(cfg.ledger_sheet, TableRef::new("Finance_DB", "data"));
        assert_eq!(cfg.report_sheet, TableRef::new("Finance_DB", "report"));
        assert_eq!(cfg.report_layout, ReportLayout::default());
        assert_eq!(cfg.store, StoreBackend::Memory);
    }

    #[test]
    fn inline_credentials_build_registry_and_policy() {
        let cfg = config(&[(
            "HOLDBOOK_CREDENTIALS_JSON",
            r#"{"passwords": {"admin": "s3cret", "auditor": "look"},
                "capabilities": {"auditor": ["view_report"]}}"#,
        )])
        .unwrap();

        assert_eq!(cfg.registry.len(), 2);
        assert_eq!(
            cfg.registry.verify(&Credentials::new("admin", "s3cret")),
            Some(Identity::new("admin"))
        );
        let auditor = cfg.capabilities.capabilities_for(&Identity::new("auditor"));
        assert!(auditor.allows(Capability::ViewReport));
        assert!(!auditor.allows(Capability::WriteLedger));
        let clerk = cfg.capabilities.capabilities_for(&Identity::new("clerk"));
        assert_eq!(clerk, CapabilitySet::WRITER);
    }

    #[test]
    fn unknown_capability_is_rejected() {
        let err = parse_credentials(r#"{"capabilities": {"x": ["delete"]}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = config(&[("HOLDBOOK_MAX_LOGIN_ATTEMPTS", "three")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { var: "HOLDBOOK_MAX_LOGIN_ATTEMPTS", .. }
        ));
        assert!(config(&[("HOLDBOOK_MAX_LOGIN_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn postgres_requires_a_database_url() {
        assert!(matches!(
            config(&[("HOLDBOOK_STORE", "postgres")]),
            Err(ConfigError::MissingEnv("DATABASE_URL"))
        ));
        let cfg = config(&[
            ("HOLDBOOK_STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/holdbook"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/holdbook".to_string()
            }
        );
    }

    #[test]
    fn remember_mode_and_report_period_are_read() {
        let cfg = config(&[
            ("HOLDBOOK_REMEMBER_MODE", "identity_only"),
            ("HOLDBOOK_REPORT_PERIOD", "2024-06"),
        ])
        .unwrap();
        assert_eq!(cfg.gate.remember_mode, RememberMode::IdentityOnly);
        assert_eq!(cfg.report_layout, ReportLayout::labeled("2024-06"));
    }
}
