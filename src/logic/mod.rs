pub mod emit;
pub mod export;
pub mod mutate;
pub mod resolve;
pub mod validate;

pub use emit::CodeEmitter;
pub use export::export;
pub use mutate::{GraphMutator, MutationResult, ResponseFieldUpdate};
pub use resolve::PathResolver;
pub use validate::{ValidationReport, Validator, Violation, ViolationKind};
