use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketplace role carried in the access token issued by the identity
/// service. `User` rents cars, `Owner` lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    User,
    Owner,
    Admin,
    Support,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::User => "User",
            UserRole::Owner => "Owner",
            UserRole::Admin => "Admin",
            UserRole::Support => "Support",
        };
        f.write_str(s)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(UserRole::User),
            "Owner" => Ok(UserRole::Owner),
            "Admin" => Ok(UserRole::Admin),
            "Support" => Ok(UserRole::Support),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated caller, passed explicitly into every usecase operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [
            UserRole::User,
            UserRole::Owner,
            UserRole::Admin,
            UserRole::Support,
        ] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("Moderator".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_check() {
        let user_id = Uuid::new_v4();

        assert!(AuthContext::new(user_id, UserRole::Admin).is_admin());
        assert!(!AuthContext::new(user_id, UserRole::User).is_admin());
    }
}
