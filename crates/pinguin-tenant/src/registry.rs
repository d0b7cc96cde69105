use std::collections::HashMap;

use pinguin_core::TenantId;

use crate::error::{Result, TenantError};
use crate::types::Tenant;

/// The tenant registry.
///
/// Loaded once at startup from the validated configuration record and
/// immutable for the lifetime of the process — reloading requires a
/// restart. Reads need no synchronization once built.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    by_id: HashMap<TenantId, Tenant>,
    id_by_host: HashMap<String, TenantId>,
    /// Preserves configuration order so the scheduler's round-robin fairness
    /// rotates tenants deterministically rather than depending on hash-map
    /// iteration order.
    ordered_ids: Vec<TenantId>,
}

impl TenantRegistry {
    /// Build a registry from a set of tenants, validating the unique-domain
    /// invariant up front so a config error surfaces at startup instead of
    /// at first HTTP request.
    pub fn build(tenants: Vec<Tenant>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(tenants.len());
        let mut id_by_host = HashMap::new();
        let mut ordered_ids = Vec::with_capacity(tenants.len());

        for tenant in tenants {
            for domain in &tenant.domains {
                let host = domain.to_lowercase();
                if let Some(existing) = id_by_host.insert(host.clone(), tenant.tenant_id.clone()) {
                    if existing != tenant.tenant_id {
                        return Err(TenantError::DuplicateDomain(host));
                    }
                }
            }
            ordered_ids.push(tenant.tenant_id.clone());
            by_id.insert(tenant.tenant_id.clone(), tenant);
        }

        Ok(Self {
            by_id,
            id_by_host,
            ordered_ids,
        })
    }

    pub fn get_by_id(&self, tenant_id: &TenantId) -> Result<&Tenant> {
        self.by_id
            .get(tenant_id)
            .ok_or_else(|| TenantError::NotFound(tenant_id.to_string()))
    }

    /// Host comparison is case-insensitive.
    pub fn get_by_host(&self, host: &str) -> Result<&Tenant> {
        let lowered = host.to_lowercase();
        let tenant_id = self
            .id_by_host
            .get(&lowered)
            .ok_or_else(|| TenantError::NotFound(lowered.clone()))?;
        self.get_by_id(tenant_id)
    }

    /// All active tenants, in stable configuration order — used by the
    /// scheduler for round-robin iteration.
    pub fn list_active(&self) -> Vec<&Tenant> {
        self.ordered_ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .filter(|t| t.is_active())
            .collect()
    }

    /// Email comparison is case-folded.
    pub fn is_admin(&self, tenant_id: &TenantId, email: &str) -> bool {
        self.by_id
            .get(tenant_id)
            .map(|t| t.is_admin(email))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RetryPolicy, TenantStatus};
    use std::collections::HashSet;

    fn tenant(id: &str, host: &str, active: bool, admins: &[&str]) -> Tenant {
        Tenant {
            tenant_id: TenantId::new(id),
            display_name: id.to_string(),
            status: if active {
                TenantStatus::Active
            } else {
                TenantStatus::Suspended
            },
            domains: vec![host.to_string()],
            admin_emails: admins.iter().map(|s| s.to_lowercase()).collect::<HashSet<_>>(),
            email_profiles: vec![],
            sms_profiles: vec![],
            retry_policy: RetryPolicy::default(),
            max_attachment_bytes: 10 * 1024 * 1024,
        }
    }

    #[test]
    fn resolves_by_id_and_host_case_insensitively() {
        let registry =
            TenantRegistry::build(vec![tenant("acme", "acme.example.com", true, &["a@acme.io"])])
                .unwrap();

        assert!(registry.get_by_id(&TenantId::new("acme")).is_ok());
        assert!(registry.get_by_host("ACME.Example.COM").is_ok());
        assert!(registry.get_by_host("unknown.example.com").is_err());
    }

    #[test]
    fn rejects_duplicate_domains_across_tenants() {
        let mut a = tenant("acme", "shared.example.com", true, &[]);
        let b = tenant("beta", "shared.example.com", true, &[]);
        a.domains.push("acme-only.example.com".into());

        let result = TenantRegistry::build(vec![a, b]);
        assert!(result.is_err());
    }

    #[test]
    fn list_active_excludes_suspended_tenants() {
        let registry = TenantRegistry::build(vec![
            tenant("acme", "acme.example.com", true, &[]),
            tenant("beta", "beta.example.com", false, &[]),
        ])
        .unwrap();

        let active = registry.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].tenant_id, TenantId::new("acme"));
    }

    #[test]
    fn admin_email_is_case_folded() {
        let registry =
            TenantRegistry::build(vec![tenant("acme", "acme.example.com", true, &["Admin@Acme.IO"])])
                .unwrap();

        assert!(registry.is_admin(&TenantId::new("acme"), "admin@acme.io"));
        assert!(registry.is_admin(&TenantId::new("acme"), "ADMIN@ACME.IO"));
        assert!(!registry.is_admin(&TenantId::new("acme"), "nobody@acme.io"));
    }
}
