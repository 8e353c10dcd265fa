//! Versioned, read-mostly registry of trusted tenants.
//!
//! Lookups read an immutable snapshot behind an `Arc`; the refresh task
//! builds a whole new snapshot and swaps it in. In-flight validations keep
//! the snapshot they started with, so refreshes never block them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::Tenant;
use crate::services::TenantStore;

/// Immutable view of the registered tenant set at one point in time.
#[derive(Debug)]
pub struct TenantSnapshot {
    pub version: u64,
    tenants: HashMap<String, Tenant>,
}

impl TenantSnapshot {
    /// Build a snapshot from a full tenant set.
    ///
    /// Fails if two tenants share an issuer URL; a registry that violates
    /// the uniqueness invariant must never be installed.
    pub fn from_tenants(version: u64, tenants: Vec<Tenant>) -> Result<Self, anyhow::Error> {
        let mut map = HashMap::with_capacity(tenants.len());
        for tenant in tenants {
            if let Some(existing) = map.insert(tenant.issuer_url.clone(), tenant) {
                return Err(anyhow::anyhow!(
                    "Duplicate issuer URL in tenant registry: {}",
                    existing.issuer_url
                ));
            }
        }
        Ok(Self {
            version,
            tenants: map,
        })
    }

    pub fn find(&self, issuer: &str) -> Option<&Tenant> {
        self.tenants.get(issuer)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub fn tenants(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.values()
    }
}

/// Holds the current snapshot and hands out cheap clones of it.
#[derive(Clone)]
pub struct TenantRegistry {
    current: Arc<RwLock<Arc<TenantSnapshot>>>,
}

impl TenantRegistry {
    pub fn new(snapshot: TenantSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Load the initial snapshot from the store. Fails fast on a store
    /// error or duplicate issuers.
    pub async fn load(store: &dyn TenantStore) -> Result<Self, anyhow::Error> {
        let tenants = store.load_all().await?;
        let snapshot = TenantSnapshot::from_tenants(1, tenants)?;
        tracing::info!(
            version = snapshot.version,
            tenant_count = snapshot.len(),
            "Tenant registry loaded"
        );
        Ok(Self::new(snapshot))
    }

    /// Current snapshot. Callers hold it for the duration of one request.
    pub fn snapshot(&self) -> Arc<TenantSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Install a new snapshot, replacing the current one.
    pub fn install(&self, snapshot: TenantSnapshot) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// Reload the full tenant set from the store and install it.
    ///
    /// On failure the previous snapshot stays installed and the error is
    /// returned for the caller to log.
    pub async fn refresh(&self, store: &dyn TenantStore) -> Result<u64, anyhow::Error> {
        let tenants = store.load_all().await?;
        let next_version = self.snapshot().version + 1;
        let snapshot = TenantSnapshot::from_tenants(next_version, tenants)?;
        let tenant_count = snapshot.len();
        self.install(snapshot);
        tracing::debug!(
            version = next_version,
            tenant_count,
            "Tenant registry refreshed"
        );
        Ok(next_version)
    }
}

/// Periodically refresh the registry from the store.
pub fn spawn_refresh_task(
    registry: TenantRegistry,
    store: Arc<dyn TenantStore>,
    interval_seconds: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately; the initial load already happened.
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(e) = registry.refresh(store.as_ref()).await {
                tracing::error!(error = %e, "Tenant registry refresh failed, keeping previous snapshot");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Tenant, TenantState};
    use async_trait::async_trait;

    struct StaticStore {
        tenants: Vec<Tenant>,
    }

    #[async_trait]
    impl TenantStore for StaticStore {
        async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
            Ok(self.tenants.clone())
        }

        async fn find_by_issuer(&self, issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
            Ok(self.tenants.iter().find(|t| t.issuer_url == issuer).cloned())
        }
    }

    fn tenant(issuer: &str) -> Tenant {
        Tenant::new(issuer.to_string(), issuer.to_string())
    }

    #[test]
    fn test_duplicate_issuer_rejected() {
        let tenants = vec![
            tenant("https://login.example.com/tenant-a"),
            tenant("https://login.example.com/tenant-a"),
        ];
        assert!(TenantSnapshot::from_tenants(1, tenants).is_err());
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot =
            TenantSnapshot::from_tenants(1, vec![tenant("https://login.example.com/tenant-a")])
                .unwrap();
        assert!(snapshot.find("https://login.example.com/tenant-a").is_some());
        assert!(snapshot.find("https://login.example.com/tenant-b").is_none());
    }

    #[tokio::test]
    async fn test_refresh_bumps_version_and_picks_up_new_tenants() {
        let store = StaticStore {
            tenants: vec![tenant("https://login.example.com/tenant-a")],
        };
        let registry = TenantRegistry::load(&store).await.unwrap();
        assert_eq!(registry.snapshot().version, 1);
        assert_eq!(registry.snapshot().len(), 1);

        let store = StaticStore {
            tenants: vec![
                tenant("https://login.example.com/tenant-a"),
                tenant("https://login.example.com/tenant-b"),
            ],
        };
        let version = registry.refresh(&store).await.unwrap();
        assert_eq!(version, 2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.find("https://login.example.com/tenant-b").is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let store = StaticStore {
            tenants: vec![tenant("https://login.example.com/tenant-a")],
        };
        let registry = TenantRegistry::load(&store).await.unwrap();

        let bad_store = StaticStore {
            tenants: vec![
                tenant("https://login.example.com/tenant-b"),
                tenant("https://login.example.com/tenant-b"),
            ],
        };
        assert!(registry.refresh(&bad_store).await.is_err());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.find("https://login.example.com/tenant-a").is_some());
    }

    #[test]
    fn test_old_snapshot_survives_install() {
        let registry = TenantRegistry::new(
            TenantSnapshot::from_tenants(1, vec![tenant("https://login.example.com/tenant-a")])
                .unwrap(),
        );
        let held = registry.snapshot();

        let mut replacement = tenant("https://login.example.com/tenant-a");
        replacement.state = TenantState::Inactive;
        registry.install(TenantSnapshot::from_tenants(2, vec![replacement]).unwrap());

        assert_eq!(held.version, 1);
        assert!(held
            .find("https://login.example.com/tenant-a")
            .unwrap()
            .is_active());
        assert!(!registry
            .snapshot()
            .find("https://login.example.com/tenant-a")
            .unwrap()
            .is_active());
    }
}
