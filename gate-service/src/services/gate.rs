//! Issuer trust gate - the multitenant trust decision.
//!
//! The identity provider is shared across all tenants, so it cannot
//! restrict which organizations may call this API. A token that verifies
//! cryptographically still proves nothing about trust; the gate decides
//! that by matching the issuer claim against the registered, active
//! tenant set. It runs on every request before any handler logic.

use std::sync::Arc;
use std::time::Duration;

use crate::services::{ServiceError, TenantRegistry, TenantStore};

/// Authenticated-tenant context produced by a successful trust decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: uuid::Uuid,
    pub issuer: String,
}

/// Decides whether a verified token's issuer belongs to a trusted tenant.
#[derive(Clone)]
pub struct IssuerTrustGate {
    registry: TenantRegistry,
    store: Arc<dyn TenantStore>,
    lookup_timeout: Duration,
}

impl IssuerTrustGate {
    pub fn new(
        registry: TenantRegistry,
        store: Arc<dyn TenantStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            lookup_timeout,
        }
    }

    /// Look up the issuer against the registered, active tenants.
    ///
    /// Snapshot hit: decide from the snapshot. Snapshot miss: one bounded
    /// store lookup, failing closed as `UntrustedIssuer` on timeout or
    /// store error. Read-only; never mutates the registry.
    pub async fn authorize_issuer(&self, issuer: &str) -> Result<TenantContext, ServiceError> {
        let snapshot = self.registry.snapshot();

        if let Some(tenant) = snapshot.find(issuer) {
            if tenant.is_active() {
                return Ok(TenantContext {
                    tenant_id: tenant.tenant_id,
                    issuer: tenant.issuer_url.clone(),
                });
            }
            tracing::warn!(issuer = %issuer, tenant_id = %tenant.tenant_id, "Rejected inactive tenant");
            return Err(ServiceError::UntrustedIssuer {
                issuer: issuer.to_string(),
            });
        }

        // Not in the snapshot: the tenant may have signed up since the
        // last refresh. One bounded store lookup, then fail closed.
        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.find_by_issuer(issuer));

        match lookup.await {
            Ok(Ok(Some(tenant))) if tenant.is_active() => Ok(TenantContext {
                tenant_id: tenant.tenant_id,
                issuer: tenant.issuer_url,
            }),
            Ok(Ok(Some(tenant))) => {
                tracing::warn!(issuer = %issuer, tenant_id = %tenant.tenant_id, "Rejected inactive tenant");
                Err(ServiceError::UntrustedIssuer {
                    issuer: issuer.to_string(),
                })
            }
            Ok(Ok(None)) => {
                tracing::warn!(issuer = %issuer, "Rejected unknown issuer");
                Err(ServiceError::UntrustedIssuer {
                    issuer: issuer.to_string(),
                })
            }
            Ok(Err(e)) => {
                tracing::warn!(issuer = %issuer, error = %e, "Tenant store lookup failed, failing closed");
                Err(ServiceError::UntrustedIssuer {
                    issuer: issuer.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(issuer = %issuer, timeout_ms = self.lookup_timeout.as_millis() as u64, "Tenant store lookup timed out, failing closed");
                Err(ServiceError::UntrustedIssuer {
                    issuer: issuer.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Tenant, TenantState};
    use crate::services::TenantSnapshot;
    use async_trait::async_trait;

    struct EmptyStore;

    #[async_trait]
    impl TenantStore for EmptyStore {
        async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
            Ok(vec![])
        }

        async fn find_by_issuer(&self, _issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
            Ok(None)
        }
    }

    struct SingleTenantStore {
        tenant: Tenant,
    }

    #[async_trait]
    impl TenantStore for SingleTenantStore {
        async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
            Ok(vec![self.tenant.clone()])
        }

        async fn find_by_issuer(&self, issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
            Ok((self.tenant.issuer_url == issuer).then(|| self.tenant.clone()))
        }
    }

    struct HangingStore;

    #[async_trait]
    impl TenantStore for HangingStore {
        async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
            Ok(vec![])
        }

        async fn find_by_issuer(&self, _issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl TenantStore for FailingStore {
        async fn load_all(&self) -> Result<Vec<Tenant>, anyhow::Error> {
            Err(anyhow::anyhow!("store unavailable"))
        }

        async fn find_by_issuer(&self, _issuer: &str) -> Result<Option<Tenant>, anyhow::Error> {
            Err(anyhow::anyhow!("store unavailable"))
        }
    }

    const ISSUER_A: &str = "https://login/tenantA";
    const ISSUER_B: &str = "https://login/tenantB";

    fn registry_with(tenants: Vec<Tenant>) -> TenantRegistry {
        TenantRegistry::new(TenantSnapshot::from_tenants(1, tenants).unwrap())
    }

    fn gate(registry: TenantRegistry, store: Arc<dyn TenantStore>) -> IssuerTrustGate {
        IssuerTrustGate::new(registry, store, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_active_registered_issuer_accepted() {
        let tenant = Tenant::new(ISSUER_A.to_string(), "Tenant A".to_string());
        let tenant_id = tenant.tenant_id;
        let gate = gate(registry_with(vec![tenant]), Arc::new(EmptyStore));

        let ctx = gate.authorize_issuer(ISSUER_A).await.unwrap();
        assert_eq!(ctx.tenant_id, tenant_id);
        assert_eq!(ctx.issuer, ISSUER_A);
    }

    #[tokio::test]
    async fn test_unknown_issuer_rejected() {
        let tenant = Tenant::new(ISSUER_A.to_string(), "Tenant A".to_string());
        let gate = gate(registry_with(vec![tenant]), Arc::new(EmptyStore));

        let result = gate.authorize_issuer(ISSUER_B).await;
        assert!(matches!(
            result,
            Err(ServiceError::UntrustedIssuer { issuer }) if issuer == ISSUER_B
        ));
    }

    #[tokio::test]
    async fn test_inactive_tenant_rejected_despite_issuer_match() {
        let mut tenant = Tenant::new(ISSUER_A.to_string(), "Tenant A".to_string());
        tenant.state = TenantState::Inactive;
        let gate = gate(registry_with(vec![tenant]), Arc::new(EmptyStore));

        let result = gate.authorize_issuer(ISSUER_A).await;
        assert!(matches!(result, Err(ServiceError::UntrustedIssuer { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_miss_falls_back_to_store() {
        let tenant = Tenant::new(ISSUER_B.to_string(), "Tenant B".to_string());
        let tenant_id = tenant.tenant_id;
        let store = Arc::new(SingleTenantStore { tenant });
        let gate = gate(registry_with(vec![]), store);

        let ctx = gate.authorize_issuer(ISSUER_B).await.unwrap();
        assert_eq!(ctx.tenant_id, tenant_id);
    }

    #[tokio::test]
    async fn test_inactive_tenant_from_store_rejected() {
        let mut tenant = Tenant::new(ISSUER_B.to_string(), "Tenant B".to_string());
        tenant.state = TenantState::Inactive;
        let store = Arc::new(SingleTenantStore { tenant });
        let gate = gate(registry_with(vec![]), store);

        let result = gate.authorize_issuer(ISSUER_B).await;
        assert!(matches!(result, Err(ServiceError::UntrustedIssuer { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_fails_closed() {
        let gate = gate(registry_with(vec![]), Arc::new(HangingStore));

        let result = gate.authorize_issuer(ISSUER_B).await;
        assert!(matches!(
            result,
            Err(ServiceError::UntrustedIssuer { issuer }) if issuer == ISSUER_B
        ));
    }

    #[tokio::test]
    async fn test_store_error_fails_closed() {
        let gate = gate(registry_with(vec![]), Arc::new(FailingStore));

        let result = gate.authorize_issuer(ISSUER_B).await;
        assert!(matches!(result, Err(ServiceError::UntrustedIssuer { .. })));
    }

    #[tokio::test]
    async fn test_repeated_lookups_agree() {
        let tenant = Tenant::new(ISSUER_A.to_string(), "Tenant A".to_string());
        let gate = gate(registry_with(vec![tenant]), Arc::new(EmptyStore));

        let first = gate.authorize_issuer(ISSUER_A).await.unwrap();
        let second = gate.authorize_issuer(ISSUER_A).await.unwrap();
        assert_eq!(first, second);
    }
}
