//! Service wiring: one process-wide instance shared behind `Arc`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use holdbook_auth::{AuthGate, CapabilityPolicy, InMemoryIssuedTokens};
use holdbook_core::SessionId;
use holdbook_infra::config::{AppConfig, StoreBackend};
use holdbook_infra::ledger::{self, LedgerReader, LedgerWriter};
use holdbook_infra::report::ReportReader;
use holdbook_infra::sessions::SessionRegistry;
use holdbook_infra::table_store::{InMemoryTableStore, TableStore, TableStoreError};

pub type SharedStore = Arc<dyn TableStore>;

pub struct AppServices {
    pub gate: AuthGate<Arc<InMemoryIssuedTokens>>,
    issued_tokens: Arc<InMemoryIssuedTokens>,
    pub capabilities: CapabilityPolicy,
    pub sessions: SessionRegistry,
    pub writer: LedgerWriter<SharedStore>,
    pub reader: LedgerReader<SharedStore>,
    pub report: ReportReader<SharedStore>,
}

impl AppServices {
    pub fn new(config: &AppConfig, store: SharedStore) -> Self {
        let (writer, reader) = ledger::open(store.clone(), config.ledger_sheet.clone());
        let issued_tokens = Arc::new(InMemoryIssuedTokens::new());
        Self {
            gate: AuthGate::new(config.registry.clone(), issued_tokens.clone(), config.gate),
            issued_tokens,
            capabilities: config.capabilities.clone(),
            sessions: SessionRegistry::new(config.session_idle),
            writer,
            reader,
            report: ReportReader::new(
                store,
                config.report_sheet.clone(),
                config.report_layout.clone(),
            ),
        }
    }

    /// Register a new session, first dropping idle sessions and expired
    /// remember-me tokens.
    pub fn start_session(&self, now: DateTime<Utc>) -> SessionId {
        self.issued_tokens.purge_expired(now);
        self.sessions.create(now)
    }
}

/// Open the configured store and wire the services around it.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, TableStoreError> {
    let store = open_store(&config.store).await?;
    info!(
        ledger = %config.ledger_sheet,
        report = %config.report_sheet,
        users = config.registry.len(),
        "services ready"
    );
    Ok(AppServices::new(config, store))
}

async fn open_store(backend: &StoreBackend) -> Result<SharedStore, TableStoreError> {
    match backend {
        StoreBackend::Memory => {
            info!("using in-memory table store; data is lost on restart");
            Ok(Arc::new(InMemoryTableStore::new()))
        }
        #[cfg(feature = "postgres")]
        StoreBackend::Postgres { database_url } => {
            let store =
                holdbook_infra::table_store::PostgresTableStore::connect(database_url).await?;
            info!("using postgres table store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StoreBackend::Postgres { .. } => Err(TableStoreError::Unavailable(
            "postgres store requested but this build lacks the `postgres` feature".to_string(),
        )),
    }
}
