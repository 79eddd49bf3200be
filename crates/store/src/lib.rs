pub mod documents;
pub mod json;
pub mod layout;
pub mod sheets;
pub mod store;
pub mod tenants;

pub mod mock;

pub use documents::TenantDocuments;
pub use json::{DefaultReason, LoadResult};
pub use layout::{DataLayout, initialize_data_dir};
pub use sheets::{HttpSheetSource, SheetSource};
pub use store::{FileStore, TenantGuard};
pub use tenants::TenantRegistry;
