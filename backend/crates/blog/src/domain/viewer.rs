//! Who is looking

use kernel::id::UserId;

/// Caller identity as far as post visibility is concerned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
    pub is_admin: bool,
}

impl Viewer {
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            is_admin: false,
        }
    }

    pub const fn user(user_id: UserId, is_admin: bool) -> Self {
        Self {
            user_id: Some(user_id),
            is_admin,
        }
    }
}
