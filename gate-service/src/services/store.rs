//! Tenant store - read access to the registered tenant set.

use async_trait::async_trait;

use crate::models::Tenant;

/// Read-only backing store for registered tenants.
///
/// The registry refresh task calls `load_all`; the gate calls
/// `find_by_issuer` on a snapshot miss.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error>;

    async fn find_by_issuer(&self, issuer: &str) -> Result<Option<Tenant>, anyhow::Error>;
}

/// Tenant store backed by a JSON file of tenant records.
pub struct FileTenantStore {
    path: String,
}

impl FileTenantStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    async fn read_tenants(&self) -> Result<Vec<Tenant>, anyhow::Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read tenant file {}: {}", self.path, e))?;

        let tenants: Vec<Tenant> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse tenant file {}: {}", self.path, e))?;

        Ok(tenants)
    }
}

#[async_trait]
impl TenantStore for FileTenantStore {
    async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
        self.read_tenants().await
    }

    async fn find_by_issuer(&self, issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
        let tenants = self.read_tenants().await?;
        Ok(tenants.into_iter().find(|t| t.issuer_url == issuer))
    }
}
