use cynic_parser_deser::ValueDeserialize;

/// ```ignore,graphql
/// directive @cost(weight: Int!) on ARGUMENT_DEFINITION | ENUM | FIELD_DEFINITION | INPUT_FIELD_DEFINITION | OBJECT | SCALAR
/// ```
#[derive(ValueDeserialize)]
pub(super) struct CostDirective {
    pub(super) weight: i32,
}

/// ```ignore,graphql
/// directive @listSize(assumedSize: Int, slicingArguments: [String!], sizedFields: [String!], requireOneSlicingArgument: Boolean = true) on FIELD_DEFINITION
/// ```
#[derive(ValueDeserialize)]
pub(super) struct ListSizeDirective<'a> {
    #[deser(rename = "assumedSize")]
    pub(super) assumed_size: Option<u32>,
    #[deser(default = Vec::new(), rename = "slicingArguments")]
    pub(super) slicing_arguments: Vec<&'a str>,
    #[deser(default = Vec::new(), rename = "sizedFields")]
    pub(super) sized_fields: Vec<&'a str>,
    #[deser(default = true, rename = "requireOneSlicingArgument")]
    pub(super) require_one_slicing_argument: bool,
}

#[derive(ValueDeserialize)]
pub(super) struct DeprecatedDirective<'a> {
    pub(super) reason: Option<&'a str>,
}
