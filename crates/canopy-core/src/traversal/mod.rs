pub mod chain;

pub use chain::{collect_ancestor_chain, ParentLink};
