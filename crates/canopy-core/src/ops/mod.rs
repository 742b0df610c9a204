pub mod page_ops;
pub mod store;

pub use page_ops::{create_page, set_slot_policy};
pub use store::Store;
