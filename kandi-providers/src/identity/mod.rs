//! Read-only view of the signed-in user. Sign-in and sign-out live elsewhere.

use crate::common_models::user::UserId;

pub mod imp;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub display_name: Option<String>,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthenticatedUser>;
}
