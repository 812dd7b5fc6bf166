use std::sync::{PoisonError, RwLock};

use crate::identity::{AuthenticatedUser, IdentityProvider};

/// Identity whose user is switched explicitly by the host.
#[derive(Default)]
pub struct FixedIdentityProvider {
    user: RwLock<Option<AuthenticatedUser>>,
}

impl FixedIdentityProvider {
    pub fn new(user: Option<AuthenticatedUser>) -> Self {
        Self {
            user: RwLock::new(user),
        }
    }

    pub fn switch_user(&self, user: Option<AuthenticatedUser>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

impl IdentityProvider for FixedIdentityProvider {
    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
