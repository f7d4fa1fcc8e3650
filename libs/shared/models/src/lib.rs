pub mod error;
pub mod slots;

pub use error::AppError;
pub use slots::{SLOT_CATALOG, is_catalog_slot};
