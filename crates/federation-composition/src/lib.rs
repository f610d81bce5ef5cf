//! GraphQL federation composition.
//!
//! Subgraph schemas are ingested into [`Subgraphs`], then [`compose()`] merges them into a
//! supergraph, runs the federation validation rules and proves with a satisfiability graph that
//! every field reachable from a root type can be resolved by some subgraph.

mod compose;
mod contracts;
mod diagnostics;
mod emit_supergraph;
mod ingest_subgraph;
mod options;
mod render_sdl;
mod result;
mod satisfiability;
mod subgraphs;
mod supergraph;
mod supergraph_model;
mod validate;

pub use self::{
    compose::{compose, compose_with_options},
    contracts::TagFilter,
    diagnostics::{Diagnostic, Diagnostics, ErrorCode, Severity},
    options::CompositionOptions,
    result::{ComposedSupergraph, CompositionResult},
    subgraphs::{IngestError, Subgraphs},
    supergraph::merge_scope_policies,
    supergraph_model::*,
};

trait VecExt<T> {
    fn push_return_idx(&mut self, elem: T) -> usize;
}

impl<T> VecExt<T> for Vec<T> {
    fn push_return_idx(&mut self, elem: T) -> usize {
        let idx = self.len();
        self.push(elem);
        idx
    }
}

#[cfg(test)]
#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::builder().parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .without_time()
        .with_test_writer()
        .init();
}
