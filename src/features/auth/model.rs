use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_STAFF};

/// Caller identity extracted from a validated bearer token.
///
/// `user_id` is the numeric id stored in the news audit fields
/// (`created_by`, `updated_by`, `published_by`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub sub: String,
    pub is_staff: bool,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Editorial access: the staff flag, or the `staff`/`admin` role
    pub fn has_staff_access(&self) -> bool {
        self.is_staff || self.has_role(ROLE_STAFF) || self.has_role(ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_staff: bool, roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 7,
            sub: "7".to_string(),
            is_staff,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_staff_access_from_flag_or_role() {
        assert!(user(true, &[]).has_staff_access());
        assert!(user(false, &["staff"]).has_staff_access());
        assert!(user(false, &["admin"]).has_staff_access());
        assert!(!user(false, &["reader"]).has_staff_access());
        assert!(!user(false, &[]).has_staff_access());
    }
}
