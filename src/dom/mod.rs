pub mod edit;
pub mod tree;

pub use edit::Edit;
pub use tree::{NodeId, PageModel};

#[cfg(test)]
pub mod testutil;
