use crate::error::ExportError;
use crate::logic::{CodeEmitter, Validator};
use crate::model::{ComponentGraph, ExportBundle, ExportOptions};

/// Checked export: configuration first, then graph validation, then emission.
///
/// The configuration check runs before validation so a bad name or port is
/// reported even on a graph that also has structural problems.
pub fn export(graph: &ComponentGraph, options: &ExportOptions) -> Result<ExportBundle, ExportError> {
    options.api.validate()?;

    let violations = Validator::validate(graph);
    if !violations.is_empty() {
        log::info!("Export blocked by {} validation error(s)", violations.len());
        return Err(ExportError::Validation(violations));
    }

    let bundle = CodeEmitter::emit(graph, options);
    log::info!(
        "Exported '{}' with {} endpoint(s)",
        options.api.name,
        graph.endpoints().count()
    );
    Ok(bundle)
}
