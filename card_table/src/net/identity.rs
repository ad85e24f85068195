//! Identity resolution.
//!
//! Sessions authenticate through an [`IdentityProvider`]. Real token
//! verification plugs in here; the bundled [`DevIdentityProvider`] trusts
//! any non-empty token.

use thiserror::Error;
use uuid::Uuid;

use crate::table::entities::Identity;

/// Display name used when the client sends none.
pub const DEFAULT_DISPLAY_NAME: &str = "Player";

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing token.")]
    MissingToken,

    #[error("Invalid token.")]
    InvalidToken,
}

pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to an identity.
    fn authenticate(&self, token: &str, display_name: Option<&str>) -> Result<Identity, AuthError>;
}

/// Development provider: the user id is derived from the token, so the same
/// token maps to the same user across reconnects.
#[derive(Clone, Copy, Debug, Default)]
pub struct DevIdentityProvider;

impl DevIdentityProvider {
    pub fn user_id_for(token: &str) -> String {
        let hex = Uuid::new_v5(&Uuid::NAMESPACE_OID, token.as_bytes())
            .simple()
            .to_string();
        format!("usr_{}", &hex[..8])
    }
}

impl IdentityProvider for DevIdentityProvider {
    fn authenticate(&self, token: &str, display_name: Option<&str>) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);
        Ok(Identity::new(Self::user_id_for(token), display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_token_same_user() {
        let provider = DevIdentityProvider;
        let a = provider.authenticate("dev-alice", Some("Alice")).unwrap();
        let b = provider.authenticate("dev-alice", Some("Al")).unwrap();
        let c = provider.authenticate("dev-bob", None).unwrap();

        assert_eq!(a.user_id, b.user_id);
        assert_ne!(a.user_id, c.user_id);
        assert!(a.user_id.starts_with("usr_"));
        assert_eq!(a.user_id.len(), 12);
    }

    #[test]
    fn test_display_name_defaults() {
        let provider = DevIdentityProvider;
        assert_eq!(
            provider.authenticate("t", None).unwrap().display_name,
            "Player"
        );
        assert_eq!(
            provider.authenticate("t", Some("  ")).unwrap().display_name,
            "Player"
        );
        assert_eq!(
            provider.authenticate("t", Some("Alice")).unwrap().display_name,
            "Alice"
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        assert_eq!(
            DevIdentityProvider.authenticate("", Some("Alice")),
            Err(AuthError::MissingToken)
        );
    }
}
