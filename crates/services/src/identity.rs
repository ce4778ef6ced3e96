use std::sync::{Arc, RwLock};

/// External source of the current learner identity.
///
/// The value may change at any time (sign-in, sign-out, account switch). A
/// store synced against a provider reloads whenever the resolved namespace
/// changes.
pub trait IdentityProvider: Send + Sync {
    /// The current identity, or `None` when nobody is signed in.
    fn current_identity(&self) -> Option<String>;
}

/// Provider holding a value set by the embedding application.
///
/// Clones share the same value.
#[derive(Clone, Default)]
pub struct StaticIdentity {
    current: Arc<RwLock<Option<String>>>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(identity: Option<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(identity)),
        }
    }

    /// Replaces the current identity.
    pub fn set(&self, identity: Option<String>) {
        match self.current.write() {
            Ok(mut guard) => *guard = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<String> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_updates() {
        let provider = StaticIdentity::new(None);
        let handle = provider.clone();
        provider.set(Some("ana".into()));
        assert_eq!(handle.current_identity().as_deref(), Some("ana"));
        provider.set(None);
        assert_eq!(handle.current_identity(), None);
    }
}
