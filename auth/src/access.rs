use crate::authenticator::AuthenticatedContext;
use crate::role::Role;

/// Outcome of an access check.
///
/// Advisory only: the caller must translate `Denied` into a forbidden
/// response itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Allow only when the caller's role is exactly `role`.
pub fn require_role(context: &AuthenticatedContext, role: Role) -> AccessDecision {
    match (context.role(), role) {
        (Role::Admin, Role::Admin) | (Role::User, Role::User) => AccessDecision::Allowed,
        (Role::Admin, Role::User) | (Role::User, Role::Admin) => AccessDecision::Denied,
    }
}

/// Allow when the caller acts on their own resource, otherwise require `role`.
pub fn require_self_or_role(
    context: &AuthenticatedContext,
    target_user_id: &str,
    role: Role,
) -> AccessDecision {
    if context.user_id() == target_user_id {
        return AccessDecision::Allowed;
    }
    require_role(context, role)
}
