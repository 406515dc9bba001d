use crate::domain::gateway_config::GatewayConfig;
use crate::repo::gateway_config_repo::GatewayConfigRepo;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn get_config(&self) -> Result<GatewayConfig>;
}

/// Fixed configuration, or none at all for an unconfigured deployment.
#[derive(Clone, Default)]
pub struct StaticConfigProvider {
    config: Option<GatewayConfig>,
}

impl StaticConfigProvider {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config: Some(config) }
    }

    pub fn unavailable() -> Self {
        Self { config: None }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn get_config(&self) -> Result<GatewayConfig> {
        self.config
            .clone()
            .ok_or_else(|| anyhow::anyhow!("gateway configuration is not available"))
    }
}

#[derive(Clone)]
pub struct ConfigCache {
    pub config_repo: GatewayConfigRepo,
    inner: Arc<RwLock<Option<(std::time::Instant, GatewayConfig)>>>,
    ttl: std::time::Duration,
}

impl ConfigCache {
    pub fn new(config_repo: GatewayConfigRepo, ttl: std::time::Duration) -> Self {
        Self {
            config_repo,
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for ConfigCache {
    async fn get_config(&self) -> Result<GatewayConfig> {
        {
            let read = self.inner.read().await;
            if let Some((loaded_at, config)) = &*read {
                if loaded_at.elapsed() <= self.ttl {
                    return Ok(config.clone());
                }
            }
        }

        let config = self
            .config_repo
            .load()
            .await?
            .ok_or_else(|| anyhow::anyhow!("no gateway_config row found"))?;
        let mut write = self.inner.write().await;
        *write = Some((std::time::Instant::now(), config.clone()));
        Ok(config)
    }
}
