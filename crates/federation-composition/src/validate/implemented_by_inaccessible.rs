use super::*;

/// An interface field in the API schema cannot be implemented by a hidden field.
pub(super) struct ImplementedByInaccessible;

impl ValidationRule for ImplementedByInaccessible {
    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        if interface.metadata.inaccessible || field.metadata.inaccessible {
            return;
        }

        for implementation in &interface.implementations {
            let Some(definition) = ctx.supergraph.definition(*implementation) else {
                continue;
            };

            if definition.metadata().inaccessible {
                continue;
            }

            let Some(implementation_field) = ctx
                .supergraph
                .fields_of(*implementation)
                .and_then(|fields| fields.get(&field.name))
            else {
                continue;
            };

            if implementation_field.metadata.inaccessible {
                ctx.push_fatal(
                    ErrorCode::ImplementedByInaccessible,
                    format!(
                        "Field \"{}\" is @inaccessible but implements the interface field \"{}\", which is in the API schema.",
                        ctx.coordinate(*implementation, field.name),
                        ctx.coordinate(interface.name, field.name),
                    ),
                );
            }
        }
    }
}
