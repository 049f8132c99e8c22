//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in the initial migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// All assignable roles, in descending privilege order.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR, ROLE_VIEWER];

/// Whether `role` may edit catalogue content (movies, people, packs, ...).
pub fn can_edit_content(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_EDITOR
}

/// Whether `role` is one of [`ALL_ROLES`].
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editors_and_admins_can_edit() {
        assert!(can_edit_content(ROLE_ADMIN));
        assert!(can_edit_content(ROLE_EDITOR));
        assert!(!can_edit_content(ROLE_VIEWER));
        assert!(!can_edit_content("superuser"));
    }

    #[test]
    fn known_roles() {
        assert!(is_known_role("viewer"));
        assert!(!is_known_role("creator"));
    }
}
