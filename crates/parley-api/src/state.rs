//! Application state wiring all services together.
//!
//! AppState loads configuration once, registers an adapter for every provider
//! whose credentials resolve, and pins the dispatch orchestrator to the SQLite
//! usage repository.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::dispatch::DispatchOrchestrator;
use parley_core::ledger::UsageLedger;
use parley_core::llm::registry::{AdapterRegistry, DispatchSettings};
use parley_core::mode::ModeResolver;
use parley_infra::config::{
    load_app_config, load_modes, modes_path, provider_config, resolve_api_key, resolve_data_dir,
};
use parley_infra::llm::create_adapter;
use parley_infra::llm::pricing::StaticRateTable;
use parley_infra::sqlite::conversation::SqliteConversationLog;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::usage::SqliteUsageRepository;
use parley_types::config::{AppConfig, ProviderConfig};
use parley_types::llm::ProviderId;

/// Dispatch orchestrator pinned to the SQLite ledger store.
pub type ConcreteOrchestrator = DispatchOrchestrator<SqliteUsageRepository>;

/// Shared application state used by every command.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub modes: Arc<ModeResolver>,
    pub conversations: Arc<SqliteConversationLog>,
    /// Effective configuration of every provider, registered or not.
    pub providers: Vec<ProviderConfig>,
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, register adapters.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await?;
        let modes = ModeResolver::new(load_modes(&modes_path(&data_dir, &config)).await?);

        let db_pool = DatabasePool::open(&data_dir).await?;

        let providers: Vec<ProviderConfig> = ProviderId::ALL
            .iter()
            .map(|id| provider_config(&config, *id))
            .collect();
        let registry = build_registry(&providers)?;

        let rates = Arc::new(StaticRateTable::new(config.pricing.clone()));
        let ledger = UsageLedger::new(SqliteUsageRepository::new(db_pool.clone()), rates);
        let orchestrator = DispatchOrchestrator::new(registry, ledger);

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            modes: Arc::new(modes),
            conversations: Arc::new(SqliteConversationLog::new(db_pool)),
            providers,
            config,
            data_dir,
        })
    }

    /// Usage store backing the ledger, for reporting.
    pub fn usage(&self) -> &SqliteUsageRepository {
        self.orchestrator.ledger().repository()
    }
}

/// Register an adapter for every provider whose API key resolves.
///
/// Providers without a key are left out; requests naming them fail with
/// `UnconfiguredProvider`.
fn build_registry(providers: &[ProviderConfig]) -> anyhow::Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();

    for config in providers {
        let api_key = match resolve_api_key(config) {
            Ok(key) => key,
            Err(e) => {
                tracing::info!(provider = %config.id, "Provider not registered: {e}");
                continue;
            }
        };

        let adapter = create_adapter(config, api_key)?;
        tracing::debug!(provider = %config.id, model = %config.model, "Registered provider");
        registry.register(adapter, DispatchSettings::from(config));
    }

    Ok(registry)
}
