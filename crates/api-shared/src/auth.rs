//! API-key authentication.
//!
//! Each configured key maps to exactly one [`Role`]. Keys are resolved once at startup from
//! the environment by the binaries and handed to [`ApiKeyProvider::from_env_values`].

use hms_core::{Identity, IdentityProvider, Role};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing x-api-key header")]
    MissingKey,
    #[error("invalid API key")]
    InvalidKey,
    #[error("no API keys configured (set HMS_ADMIN_API_KEY and/or HMS_CLERK_API_KEY)")]
    NotConfigured,
    #[error("the same API key is configured for more than one role")]
    DuplicateKey,
}

/// Resolves API keys to identities.
#[derive(Clone)]
pub struct ApiKeyProvider {
    keys: Vec<(String, Role)>,
}

impl std::fmt::Debug for ApiKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let roles: Vec<Role> = self.keys.iter().map(|(_, role)| *role).collect();
        f.debug_struct("ApiKeyProvider").field("roles", &roles).finish()
    }
}

impl ApiKeyProvider {
    /// Builds a provider from `(key, role)` pairs. Blank keys are ignored.
    pub fn new(keys: impl IntoIterator<Item = (String, Role)>) -> Result<Self, AuthError> {
        let mut resolved: Vec<(String, Role)> = Vec::new();
        for (key, role) in keys {
            let key = key.trim().to_owned();
            if key.is_empty() {
                continue;
            }
            if resolved.iter().any(|(existing, _)| existing == &key) {
                return Err(AuthError::DuplicateKey);
            }
            resolved.push((key, role));
        }
        if resolved.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        Ok(Self { keys: resolved })
    }

    /// Builds a provider from the raw `HMS_ADMIN_API_KEY` / `HMS_CLERK_API_KEY` values.
    pub fn from_env_values(
        admin_key: Option<String>,
        clerk_key: Option<String>,
    ) -> Result<Self, AuthError> {
        let keys = admin_key
            .map(|k| (k, Role::Admin))
            .into_iter()
            .chain(clerk_key.map(|k| (k, Role::Clerk)));
        Self::new(keys)
    }

    /// Validates the provided header value.
    ///
    /// Returns the caller's identity, or an error if the key is missing or unknown.
    pub fn authenticate(&self, provided_key: Option<&str>) -> Result<Identity, AuthError> {
        let provided_key = provided_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingKey)?;

        self.resolve(provided_key).ok_or_else(|| {
            tracing::warn!("rejected request with unknown API key");
            AuthError::InvalidKey
        })
    }
}

impl IdentityProvider for ApiKeyProvider {
    fn resolve(&self, credential: &str) -> Option<Identity> {
        self.keys
            .iter()
            .find(|(key, _)| key == credential)
            .map(|(_, role)| Identity::new(format!("{}-key", role), *role))
    }
}
