//! Maps an external, possibly absent identity to a persistence namespace.

use crate::model::Namespace;

/// Namespace used when no identity is available.
pub const GUEST_NAMESPACE: &str = "guest";

/// Resolves the namespace for an identity.
///
/// Absent, empty and whitespace-only identities map to [`GUEST_NAMESPACE`].
/// Any other identity is used verbatim: no case folding and no trimming.
#[must_use]
pub fn resolve_namespace(identity: Option<&str>) -> Namespace {
    match identity {
        Some(id) if !id.trim().is_empty() => Namespace::new(id),
        _ => Namespace::new(GUEST_NAMESPACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_identity_is_guest() {
        assert_eq!(resolve_namespace(None).as_str(), GUEST_NAMESPACE);
        assert_eq!(resolve_namespace(Some("")).as_str(), GUEST_NAMESPACE);
        assert_eq!(resolve_namespace(Some("  ")).as_str(), GUEST_NAMESPACE);
    }

    #[test]
    fn identity_is_used_verbatim() {
        assert_eq!(resolve_namespace(Some("Ana@Example.com")).as_str(), "Ana@Example.com");
        assert_ne!(
            resolve_namespace(Some("ana@example.com")),
            resolve_namespace(Some("Ana@example.com"))
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        assert_eq!(resolve_namespace(Some("u-42")), resolve_namespace(Some("u-42")));
    }
}
