use super::*;

/// Input objects only keep the fields every subgraph knows about. A required field that some
/// subgraph lacks cannot be dropped.
pub(super) struct RequiredInputFieldMissingInSomeSubgraph;

impl ValidationRule for RequiredInputFieldMissingInSomeSubgraph {
    fn input_object_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        input_object: &InputObjectTypeState,
        field: &InputValueState,
    ) {
        let required_in: Vec<&str> = field
            .by_graph
            .iter()
            .filter(|(_, r#type)| r#type.wrapping.is_non_null())
            .map(|(id, _)| ctx.subgraph_name(*id))
            .collect();

        if required_in.is_empty() {
            return;
        }

        let missing_in: Vec<&str> = input_object
            .by_graph
            .keys()
            .filter(|id| !field.by_graph.contains_key(*id))
            .map(|id| ctx.subgraph_name(*id))
            .collect();

        if missing_in.is_empty() {
            return;
        }

        ctx.push_fatal(
            ErrorCode::RequiredInputFieldMissingInSomeSubgraph,
            format!(
                "Input object field \"{}\" is required in some subgraphs but does not appear in all subgraphs: it is required in {} but does not appear in {}",
                ctx.coordinate(input_object.name, field.name),
                human_readable_subgraphs(required_in),
                human_readable_subgraphs(missing_in),
            ),
        );
    }
}
