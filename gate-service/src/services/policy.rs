//! Capability policy evaluation.
//!
//! Maps an authenticated identity's granted scopes to an allow/deny per
//! required capability. Runs only after the issuer trust gate has
//! accepted the request; a deny here is a permission failure (403), never
//! an authentication failure.

/// Capability policy evaluator.
#[derive(Debug, Clone)]
pub struct PolicyService;

impl PolicyService {
    /// Check whether the granted scopes satisfy the required capability.
    ///
    /// `*` grants everything; a trailing `*` grants the prefix, e.g.
    /// `registry:*` satisfies `registry:read`.
    pub fn is_allowed(granted_scopes: &[String], required: &str) -> bool {
        for granted in granted_scopes {
            if granted == "*" {
                return true;
            }
            if granted == required {
                return true;
            }
            if let Some(prefix) = granted.strip_suffix('*') {
                if required.starts_with(prefix) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_allowed() {
        assert!(PolicyService::is_allowed(
            &scopes(&["registry:read"]),
            "registry:read"
        ));
    }

    #[test]
    fn test_superscope_allows_everything() {
        assert!(PolicyService::is_allowed(&scopes(&["*"]), "registry:read"));
    }

    #[test]
    fn test_prefix_wildcard() {
        assert!(PolicyService::is_allowed(
            &scopes(&["registry:*"]),
            "registry:read"
        ));
        assert!(!PolicyService::is_allowed(
            &scopes(&["registry:*"]),
            "tenant:read"
        ));
    }

    #[test]
    fn test_unrelated_scope_denied() {
        assert!(!PolicyService::is_allowed(
            &scopes(&["tenant:read"]),
            "registry:read"
        ));
    }

    #[test]
    fn test_empty_scopes_denied() {
        assert!(!PolicyService::is_allowed(&[], "registry:read"));
    }
}
