use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
    activity::ActivityLog,
    config::NetworkConfig,
    error::{EncryptionError, Error},
    time::bounded,
};

use super::EncryptionService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub chain_id: u64,
    pub contract: Address,
    pub gateway_url: Option<String>,
}

impl From<&NetworkConfig> for InstanceConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            contract: config.contract,
            gateway_url: config.gateway_url.clone(),
        }
    }
}

/// Provider of encryption service instances, e.g. a relayer client.
#[async_trait]
pub trait EncryptionBackend: Send + Sync {
    async fn load(&self) -> Result<(), EncryptionError>;

    async fn init(&self) -> Result<(), EncryptionError>;

    async fn create_instance(
        &self,
        config: &InstanceConfig,
    ) -> Result<Arc<dyn EncryptionService>, EncryptionError>;
}

/// Brings up an encryption service. Each step runs under the initialization
/// timeout and a timeout stays distinguishable from a service failure.
pub async fn initialize(
    backend: &dyn EncryptionBackend,
    config: &NetworkConfig,
    activity: &ActivityLog,
) -> Result<Arc<dyn EncryptionService>, Error> {
    let result = run_steps(backend, config, activity).await;
    match &result {
        Ok(_) => activity.success("Encryption service initialized", None),
        Err(err) => {
            let message = format!("Encryption service initialization failed: {err}");
            activity.error(message, None);
        }
    }
    result
}

async fn run_steps(
    backend: &dyn EncryptionBackend,
    config: &NetworkConfig,
    activity: &ActivityLog,
) -> Result<Arc<dyn EncryptionService>, Error> {
    let limit = config.init_timeout;

    activity.pending("Loading encryption service", None);
    bounded(limit, "encryption service load", backend.load())
        .await?
        .map_err(Error::EncryptionFailed)?;

    activity.pending("Initializing encryption runtime", None);
    bounded(limit, "encryption runtime init", backend.init())
        .await?
        .map_err(Error::EncryptionFailed)?;

    activity.pending("Creating encryption instance", None);
    let instance = InstanceConfig::from(config);
    bounded(
        limit,
        "encryption instance creation",
        backend.create_instance(&instance),
    )
    .await?
    .map_err(Error::EncryptionFailed)
}
