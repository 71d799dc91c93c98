//! Roles, capabilities and resolved identities.
//!
//! Authentication happens outside this crate. An [`IdentityProvider`] turns whatever credential
//! the surface received into an [`Identity`]; callers then ask the identity for a
//! [`Capability`] before issuing a mutation. The role is never inferred from user-controlled
//! strings such as e-mail addresses.

use crate::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Chief of department: oversight, posts and notifications.
    Admin,
    /// Front-desk clerk: directory, appointments and queues.
    Clerk,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Clerk => "clerk",
        }
    }

    pub fn allows(self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Clerk => matches!(
                capability,
                Capability::ManageDirectory | Capability::ManageScheduling | Capability::Engage
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "chief" => Ok(Role::Admin),
            "clerk" => Ok(Role::Clerk),
            other => Err(StoreError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, edit and delete patients, doctors and nurses.
    ManageDirectory,
    /// Appointments, slot templates, waitlist and transfers.
    ManageScheduling,
    /// Publish and edit community posts, send notifications.
    Publish,
    /// Approve or reject notifications.
    ReviewNotifications,
    /// Like and comment on posts.
    Engage,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::ManageDirectory => "manage the directory",
            Capability::ManageScheduling => "manage scheduling",
            Capability::Publish => "publish",
            Capability::ReviewNotifications => "review notifications",
            Capability::Engage => "engage with posts",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated caller as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

impl Identity {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// Returns `Forbidden` unless this identity's role holds `capability`.
    pub fn require(&self, capability: Capability) -> StoreResult<()> {
        if self.role.allows(capability) {
            return Ok(());
        }
        tracing::warn!(
            subject = %self.subject,
            role = %self.role,
            capability = %capability,
            "capability check refused"
        );
        Err(StoreError::Forbidden {
            role: self.role,
            capability,
        })
    }
}

/// Resolves a presented credential into an identity.
pub trait IdentityProvider: Send + Sync {
    /// Returns `None` when the credential is unknown.
    fn resolve(&self, credential: &str) -> Option<Identity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_holds_every_capability() {
        for capability in [
            Capability::ManageDirectory,
            Capability::ManageScheduling,
            Capability::Publish,
            Capability::ReviewNotifications,
            Capability::Engage,
        ] {
            assert!(Role::Admin.allows(capability));
        }
    }

    #[test]
    fn test_clerk_cannot_publish_or_review() {
        let clerk = Identity::new("front-desk", Role::Clerk);

        assert!(clerk.require(Capability::ManageScheduling).is_ok());
        assert!(clerk.require(Capability::Engage).is_ok());

        let err = clerk
            .require(Capability::Publish)
            .expect_err("clerk should not publish");
        assert!(matches!(
            err,
            StoreError::Forbidden {
                role: Role::Clerk,
                capability: Capability::Publish
            }
        ));
        assert!(clerk.require(Capability::ReviewNotifications).is_err());
    }

    #[test]
    fn test_role_parses_chief_alias() {
        assert_eq!("Chief".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" clerk ".parse::<Role>().unwrap(), Role::Clerk);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
