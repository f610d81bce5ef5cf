use crate::{
    diagnostics::{Diagnostics, ErrorCode},
    emit_supergraph::emit_supergraph,
    options::CompositionOptions,
    render_sdl,
    result::{ComposedSupergraph, CompositionResult},
    satisfiability::validate_satisfiability,
    subgraphs::Subgraphs,
    supergraph::SupergraphState,
    validate::validate,
};

/// Compose subgraphs into a supergraph with the default [`CompositionOptions`].
pub fn compose(subgraphs: &Subgraphs) -> CompositionResult {
    compose_with_options(subgraphs, &CompositionOptions::default())
}

/// Compose subgraphs into a supergraph.
///
/// The supergraph is only produced when no fatal diagnostic was emitted. With
/// `warnings_are_fatal`, warnings count as fatal.
pub fn compose_with_options(subgraphs: &Subgraphs, options: &CompositionOptions) -> CompositionResult {
    let _span = tracing::info_span!("compose", subgraphs = subgraphs.len()).entered();

    let mut diagnostics = Diagnostics::default();

    subgraphs.emit_ingestion_diagnostics(&mut diagnostics);

    let supergraph = match SupergraphState::build(subgraphs) {
        Ok(supergraph) => supergraph,
        Err(error) => {
            diagnostics.push_fatal(ErrorCode::TypeKindMismatch, error.to_string());
            return failed(diagnostics, options);
        }
    };

    validate(subgraphs, &supergraph, &mut diagnostics);

    if options.run_satisfiability && !diagnostics.any_fatal() {
        validate_satisfiability(subgraphs, &supergraph, &mut diagnostics);
    }

    if options.warnings_are_fatal {
        diagnostics.promote_warnings();
    }

    if diagnostics.any_fatal() {
        tracing::debug!(diagnostics = diagnostics.len(), "composition failed");
        return CompositionResult {
            supergraph: None,
            diagnostics,
        };
    }

    let model = emit_supergraph(subgraphs, &supergraph);
    let supergraph_sdl = render_sdl::render_supergraph_sdl(&model);
    let public_sdl = render_sdl::render_public_sdl(&model);

    CompositionResult {
        supergraph: Some(ComposedSupergraph {
            model,
            supergraph_sdl,
            public_sdl,
        }),
        diagnostics,
    }
}

fn failed(mut diagnostics: Diagnostics, options: &CompositionOptions) -> CompositionResult {
    if options.warnings_are_fatal {
        diagnostics.promote_warnings();
    }

    CompositionResult {
        supergraph: None,
        diagnostics,
    }
}
