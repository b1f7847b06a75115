//! Account roles.

use serde::{Deserialize, Deserializer, Serialize};

/// Account role stored on a user profile.
///
/// Roles decide post-login routing and which profile documents get written
/// at registration. Stored documents can carry role values outside the
/// known set (older clients, manual console edits); those deserialize as
/// [`Role::Unknown`] rather than failing the read, so routing stays total
/// and can fall back to the default destination. An empty string counts
/// as unset and reads as the default role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Pharmacy operator account.
    Pharmacy,
    /// Regular customer account.
    #[default]
    User,
    /// A stored role value this client does not recognize.
    Unknown,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "admin" => Self::Admin,
            "pharmacy" => Self::Pharmacy,
            // Empty means the field was never filled in.
            "user" | "" => Self::User,
            _ => Self::Unknown,
        })
    }
}

impl Role {
    /// Whether this is one of the roles a client can register with.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Pharmacy => write!(f, "pharmacy"),
            Self::User => write!(f, "user"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "pharmacy" => Ok(Self::Pharmacy),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}. Valid roles: admin, pharmacy, user")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Pharmacy).unwrap(), "\"pharmacy\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn unrecognized_value_deserializes_as_unknown() {
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::Unknown);
        assert!(!role.is_known());
    }

    #[test]
    fn empty_value_reads_as_the_default_role() {
        let role: Role = serde_json::from_str("\"\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert_eq!("pharmacy".parse::<Role>().unwrap(), Role::Pharmacy);
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn display_roundtrips_for_known_roles() {
        for role in [Role::Admin, Role::Pharmacy, Role::User] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
