//! Code emission: turns a validated graph and an export configuration into
//! the text of an Express server, its `.env` file and a README.
//!
//! Emission is a pure function of its inputs. It assumes the caller already
//! ran [`Validator`](crate::logic::Validator) and checked the
//! [`ApiConfig`](crate::model::ApiConfig); it does not re-check either.
//! Use [`export`](crate::logic::export) for the checked pipeline.

pub mod database;
pub mod env;
pub mod readme;
pub mod server;

use crate::model::{ComponentGraph, ExportBundle, ExportOptions};

pub use readme::dependencies;

pub struct CodeEmitter;

impl CodeEmitter {
    pub fn server_source(graph: &ComponentGraph, options: &ExportOptions) -> String {
        server::server_source(graph, options)
    }

    pub fn env_file(options: &ExportOptions) -> String {
        env::env_file(options)
    }

    pub fn readme(graph: &ComponentGraph, options: &ExportOptions) -> String {
        readme::readme(graph, options)
    }

    /// All artifacts at once; `env` is `None` when there is nothing to write
    pub fn emit(graph: &ComponentGraph, options: &ExportOptions) -> ExportBundle {
        let env = Self::env_file(options);
        ExportBundle {
            server: Self::server_source(graph, options),
            env: (!env.is_empty()).then_some(env),
            readme: Self::readme(graph, options),
        }
    }
}
