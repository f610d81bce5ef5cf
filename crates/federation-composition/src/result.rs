use crate::{Diagnostics, SupergraphModel, TagFilter};

/// The result of a [`compose()`](crate::compose()) invocation.
pub struct CompositionResult {
    pub(crate) supergraph: Option<ComposedSupergraph>,
    pub(crate) diagnostics: Diagnostics,
}

impl CompositionResult {
    /// Simplify the result data to a yes-no answer: did composition succeed?
    ///
    /// `Ok()` contains the [ComposedSupergraph].
    /// `Err()` contains all [Diagnostics].
    pub fn into_result(self) -> Result<ComposedSupergraph, Diagnostics> {
        if let Some(supergraph) = self.supergraph {
            Ok(supergraph)
        } else {
            // means a fatal error occured
            Err(self.diagnostics)
        }
    }

    /// The composed supergraph, if composition succeeded.
    pub fn supergraph(&self) -> Option<&ComposedSupergraph> {
        self.supergraph.as_ref()
    }

    /// Composition warnings and errors.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The failure payload: `{"errors": [{"message", "extensions": {"code"}}]}`.
    pub fn errors_json(&self) -> serde_json::Value {
        self.diagnostics.errors_json()
    }
}

/// A successfully composed, satisfiable supergraph.
#[derive(Debug, Clone)]
pub struct ComposedSupergraph {
    pub(crate) model: SupergraphModel,
    pub(crate) supergraph_sdl: String,
    pub(crate) public_sdl: String,
}

impl ComposedSupergraph {
    /// The supergraph SDL, with the `join__` machinery the gateway plans queries with.
    pub fn supergraph_sdl(&self) -> &str {
        &self.supergraph_sdl
    }

    /// The API schema exposed to clients.
    pub fn public_sdl(&self) -> &str {
        &self.public_sdl
    }

    pub fn model(&self) -> &SupergraphModel {
        &self.model
    }

    /// The API schema of a contract: elements filtered out by `filter` are hidden.
    pub fn contract_sdl(&self, filter: &TagFilter) -> String {
        crate::render_sdl::render_public_sdl(&filter.apply(&self.model))
    }
}
