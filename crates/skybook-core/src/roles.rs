//! Role model and the request-time authorization guard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role tags a user can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// May manage users and issue registration tokens.
    Admin,
    /// May search flights and create bookings.
    TravelAgent,
    /// May additionally approve and delete bookings.
    TravelLead,
}

impl Role {
    /// All known roles.
    pub const ALL: [Role; 3] = [Role::Admin, Role::TravelAgent, Role::TravelLead];

    /// Canonical string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::TravelAgent => "travel-agent",
            Role::TravelLead => "travel-lead",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a role tag.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRoleError(s.to_string()))
    }
}

/// Any-of authorization check.
///
/// Allows when the caller holds at least one of the required roles. An empty
/// `required` set means authenticated-only: any caller that made it far
/// enough to present a role set at all is allowed. Callers are responsible
/// for having authenticated the subject first; a missing or invalid session
/// is a separate condition handled earlier in the pipeline.
pub fn authorize(required: &[Role], present: &BTreeSet<Role>) -> bool {
    required.is_empty() || required.iter().any(|role| present.contains(role))
}
