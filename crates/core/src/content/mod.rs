//! Content items, providers and the permission boundary.

pub mod fs;
pub mod memory;
pub mod permission;
pub mod provider;
pub mod types;

pub use fs::DirectoryProvider;
pub use memory::MemoryProvider;
pub use permission::{AllowAll, DenyAll, PermissionChecker};
pub use provider::{ContentProvider, ProviderError, ProviderRegistry};
pub use types::{ContentAction, ContentEvent, ContentRef};
