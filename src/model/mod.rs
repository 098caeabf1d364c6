pub mod common;
pub mod export;
pub mod graph;
pub mod node;
pub mod tree;

pub use common::*;
pub use export::*;
pub use graph::*;
pub use node::*;
pub use tree::*;
