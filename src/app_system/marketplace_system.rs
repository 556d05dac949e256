use tracing::{error, info, instrument};

use crate::actors::{RegistryService, SessionService};
use crate::clients::{RegistryClient, SessionClient};
use crate::config::Config;
use crate::session::{AccountDirectory, SessionManager};
use crate::store::IdentityStore;

/// Starts the session and registry services, hands out their clients, and
/// shuts them down again.
pub struct MarketplaceSystem {
    pub session_client: SessionClient,
    pub registry_client: RegistryClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl MarketplaceSystem {
    /// Builds the session store named by `config` and starts both services.
    #[instrument(name = "marketplace_system", skip(config))]
    pub fn new(config: &Config) -> Self {
        let store = IdentityStore::new(config.session_store());
        Self::with_store(config, store)
    }

    /// Starts the system on an explicit identity store.
    pub fn with_store(config: &Config, store: IdentityStore) -> Self {
        info!(latency_ms = config.latency.as_millis() as u64, "Starting marketplace system");

        let accounts = if config.demo_accounts {
            AccountDirectory::with_demo_accounts()
        } else {
            AccountDirectory::new()
        };
        let mut handles = Vec::new();

        let (session_service, session_client) =
            SessionService::new(config.channel_buffer, SessionManager::new(store, accounts));
        handles.push(tokio::spawn(session_service.run()));

        let (registry_service, registry_client) = RegistryService::new(config.channel_buffer);
        handles.push(tokio::spawn(registry_service.run()));

        info!("Marketplace system started successfully");

        Self {
            session_client: session_client.with_latency(config.latency),
            registry_client: registry_client.with_latency(config.latency),
            handles,
        }
    }

    /// Sends `Shutdown` to every service and waits for their tasks.
    /// Errors are logged so one failed service does not block the others.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down marketplace system");

        if let Err(e) = self.session_client.shutdown().await {
            error!(error = %e, "Session service shutdown request failed");
        }
        if let Err(e) = self.registry_client.shutdown().await {
            error!(error = %e, "Registry service shutdown request failed");
        }

        let mut failed = 0;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(format!("{} service task(s) failed", failed));
        }
        info!("Marketplace system shutdown complete");
        Ok(())
    }
}
