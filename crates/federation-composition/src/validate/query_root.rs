use super::*;

#[derive(Default)]
pub(super) struct QueryRoot {
    has_query_fields: bool,
}

impl ValidationRule for QueryRoot {
    fn object_type(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState) {
        if ctx.str(object.name) == "Query" && object.fields.values().any(|field| !field.by_graph.is_empty()) {
            self.has_query_fields = true;
        }
    }

    fn finish(&mut self, ctx: &mut ValidationContext<'_>) {
        if !self.has_query_fields {
            ctx.push_fatal(
                ErrorCode::NoQueries,
                String::from("No queries found in any subgraph: a supergraph must have a query root type."),
            );
        }
    }
}
