//! View-permission boundary.

use super::types::ContentRef;

/// Decides whether the current viewer may see an item.
pub trait PermissionChecker: Send + Sync {
    fn has_view_permission(&self, content: &ContentRef) -> bool;
}

/// Grants every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn has_view_permission(&self, _content: &ContentRef) -> bool {
        true
    }
}

/// Denies every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl PermissionChecker for DenyAll {
    fn has_view_permission(&self, _content: &ContentRef) -> bool {
        false
    }
}

impl<F> PermissionChecker for F
where
    F: Fn(&ContentRef) -> bool + Send + Sync,
{
    fn has_view_permission(&self, content: &ContentRef) -> bool {
        self(content)
    }
}
