use federation_composition::{
    compose, compose_with_options, merge_scope_policies, CompositionOptions, CompositionResult, Diagnostics,
    ErrorCode, Subgraphs, TypeDefinitionKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::builder().parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .init();
}

fn subgraphs(sdls: &[(&str, &str)]) -> Subgraphs {
    let mut subgraphs = Subgraphs::default();

    for (name, sdl) in sdls {
        let url = format!("http://{name}.example.com");
        subgraphs.ingest_str(sdl, name, Some(&url)).unwrap();
    }

    subgraphs
}

fn compose_sdls(sdls: &[(&str, &str)]) -> CompositionResult {
    compose(&subgraphs(sdls))
}

fn errors(diagnostics: &Diagnostics, code: ErrorCode) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.is_fatal() && diagnostic.code() == code)
        .map(|diagnostic| diagnostic.message().to_owned())
        .collect()
}

fn fed2(imports: &str) -> String {
    format!(r#"extend schema @link(url: "https://specs.apollo.dev/federation/v2.6", import: [{imports}])"#)
}

#[test]
fn shared_authenticated_entity() {
    let header = fed2(r#""@key", "@authenticated""#);
    let a = format!(
        r#"{header}
        type Query {{ me: User }}
        type User @key(fields: "id") @authenticated {{ id: ID! }}"#
    );
    let b = format!(
        r#"{header}
        type User @key(fields: "id") @authenticated {{ id: ID! }}"#
    );

    let supergraph = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(
        sdl.contains(
            "type User\n  @join__type(graph: A, key: \"id\")\n  @join__type(graph: B, key: \"id\")\n  @authenticated\n{\n  id: ID!\n}\n"
        ),
        "{sdl}"
    );
    assert_eq!(sdl.matches("  @authenticated\n").count(), 1);
    assert!(sdl.contains(r#"@link(url: "https://specs.apollo.dev/authenticated/v0.1", for: SECURITY)"#));
    assert!(sdl.contains("  A @join__graph(name: \"a\", url: \"http://a.example.com\")\n"));

    assert_eq!(
        supergraph.public_sdl(),
        "type Query {\n  me: User\n}\n\ntype User {\n  id: ID!\n}\n"
    );
}

#[test]
fn field_external_everywhere() {
    let header = fed2(r#""@key", "@external""#);
    let a = format!(
        r#"{header}
        type Query {{ product: Product }}
        type Product @key(fields: "id") {{ id: ID! name: String @external }}"#
    );
    let b = format!(
        r#"{header}
        type Product @key(fields: "id") {{ id: ID! name: String @external }}"#
    );

    let result = compose_sdls(&[("a", &a), ("b", &b)]);
    assert!(result.supergraph().is_none());

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::ExternalMissingOnBase),
        [r#"Field "Product.name" is marked @external on all the subgraphs in which it is listed (subgraphs "a" and "b")."#]
    );
}

fn override_with_requires(override_arguments: &str) -> CompositionResult {
    let header = fed2(r#""@key", "@external", "@requires", "@override""#);
    let original = format!(
        r#"{header}
        type Query {{ products: [Product] }}
        type Product @key(fields: "id") {{
          id: ID!
          weight: Int @external
          shippingCost: Int @requires(fields: "weight")
        }}"#
    );
    let new = format!(
        r#"{header}
        type Product @key(fields: "id") {{
          id: ID!
          weight: Int
          shippingCost: Int @override({override_arguments})
        }}"#
    );

    compose_sdls(&[("original", &original), ("new", &new)])
}

#[test]
fn progressive_override_of_a_field_with_requires() {
    let result = override_with_requires(r#"from: "original", label: "percent(50)""#);

    assert!(result.supergraph().is_none());
    assert_eq!(
        errors(result.diagnostics(), ErrorCode::OverrideCollisionWithAnotherDirective),
        [r#"@override cannot be used on field "Product.shippingCost" on subgraph "new" since "Product.shippingCost" on "original" is marked with directive "@requires""#]
    );
}

#[test]
fn plain_override_of_a_field_with_requires() {
    let result = override_with_requires(r#"from: "original""#);
    let errors: Vec<&str> = result.diagnostics().iter_errors().collect();
    assert!(errors.is_empty(), "{errors:#?}");

    let supergraph = result.into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(
        sdl.contains(
            "  shippingCost: Int @join__field(graph: ORIGINAL, requires: \"weight\") @join__field(graph: NEW, override: \"original\")\n"
        ),
        "{sdl}"
    );
    assert!(sdl.contains(r#"@link(url: "https://specs.apollo.dev/join/v0.3", for: EXECUTION)"#));
}

#[rstest]
#[case::in_one_group(&[vec!["a", "b"]], &[vec!["c"]], &[&["a", "b", "c"][..]])]
#[case::superset_is_pruned(&[vec!["a"], vec!["b"]], &[vec!["a"]], &[&["a"][..]])]
#[case::empty_side(&[vec!["b", "a"]], &[], &[&["a", "b"][..]])]
fn scope_policies(#[case] left: &[Vec<&str>], #[case] right: &[Vec<&str>], #[case] expected: &[&[&str]]) {
    let merged = merge_scope_policies(left, right);

    assert_eq!(merged, expected);

    for group in &merged {
        for other in &merged {
            let strict_superset = group.len() > other.len() && other.iter().all(|item| group.contains(item));
            assert!(!strict_superset, "{group:?} is redundant with {other:?}");
        }
    }
}

#[test]
fn output_enums_take_the_union_of_values() {
    let header = fed2(r#""@key""#);
    let a = format!(
        r#"{header}
        type Query {{ color: Color }}
        enum Color {{ RED GREEN }}"#
    );
    let b = format!(
        r#"{header}
        type Query {{ paint: Color }}
        enum Color {{ RED BLUE }}"#
    );

    let supergraph = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();

    assert!(supergraph
        .public_sdl()
        .contains("enum Color {\n  RED\n  GREEN\n  BLUE\n}\n"));
    assert!(supergraph.supergraph_sdl().contains(
        "  RED @join__enumValue(graph: A) @join__enumValue(graph: B)\n  GREEN @join__enumValue(graph: A)\n  BLUE @join__enumValue(graph: B)\n"
    ));
}

#[test]
fn input_enums_hide_values_missing_somewhere() {
    let header = fed2(r#""@key""#);
    let a = format!(
        r#"{header}
        type Query {{ paint(color: Color): Boolean }}
        enum Color {{ RED GREEN }}"#
    );
    let b = format!(
        r#"{header}
        type Query {{ repaint(color: Color): Boolean }}
        enum Color {{ RED BLUE }}"#
    );

    let supergraph = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(supergraph.public_sdl().contains("enum Color {\n  RED\n}\n"));
    assert!(sdl.contains("  GREEN @join__enumValue(graph: A) @inaccessible\n"), "{sdl}");
    assert!(sdl.contains("  BLUE @join__enumValue(graph: B) @inaccessible\n"), "{sdl}");
    assert!(sdl.contains(r#"@link(url: "https://specs.apollo.dev/inaccessible/v0.2", for: SECURITY)"#));
}

#[rstest]
#[case::policy_missing("", false)]
#[case::same_policy(r#"@policy(policies: [["x"]])"#, true)]
#[case::stronger_policy(r#"@policy(policies: [["x", "y"]])"#, true)]
#[case::unrelated_policy(r#"@policy(policies: [["y"]])"#, false)]
fn requires_need_the_required_fields_access(#[case] estimate_policy: &str, #[case] composes: bool) {
    let header = fed2(r#""@key", "@external", "@requires", "@policy""#);
    let products = format!(
        r#"{header}
        type Query {{ products: [Product] }}
        type Product @key(fields: "id") {{ id: ID! weight: Int @policy(policies: [["x"]]) }}"#
    );
    let shipping = format!(
        r#"{header}
        type Product @key(fields: "id") {{
          id: ID!
          weight: Int @external
          estimate: Int @requires(fields: "weight") {estimate_policy}
        }}"#
    );

    let result = compose_sdls(&[("products", &products), ("shipping", &shipping)]);
    let missing = errors(result.diagnostics(), ErrorCode::MissingTransitiveAuthRequirements);

    if composes {
        assert!(missing.is_empty(), "{missing:#?}");
        assert!(result.supergraph().is_some());
    } else {
        assert_eq!(
            missing,
            [r#"[shipping] Field "Product.estimate" does not specify necessary @authenticated, @requiresScopes and/or @policy auth requirements to access the transitive field "Product.weight" data from @requires selection set."#]
        );
    }
}

const ACCOUNTS_V1: &str = r#"
    type Query { me: User }
    type User @key(fields: "id") { id: ID! name: String }
"#;

const REVIEWS_V1: &str = r#"
    extend type User @key(fields: "id") { id: ID! @external reviews: [String] }
"#;

const ACCOUNTS_V2: &str = r#"
    extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])
    type Query { me: User }
    type User @key(fields: "id") { id: ID! name: String }
"#;

const REVIEWS_V2: &str = r#"
    extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])
    type User @key(fields: "id") { id: ID! reviews: [String] }
"#;

#[rstest]
#[case::v1(ACCOUNTS_V1, REVIEWS_V1)]
#[case::v2(ACCOUNTS_V2, REVIEWS_V2)]
#[case::mixed(ACCOUNTS_V2, REVIEWS_V1)]
fn entity_split_across_subgraphs(#[case] accounts: &str, #[case] reviews: &str) {
    let supergraph = compose_sdls(&[("accounts", accounts), ("reviews", reviews)])
        .into_result()
        .unwrap();

    assert_eq!(
        supergraph.public_sdl(),
        "type Query {\n  me: User\n}\n\ntype User {\n  id: ID!\n  name: String\n  reviews: [String]\n}\n"
    );
}

#[test]
fn v1_extensions_are_marked_in_join_type() {
    let supergraph = compose_sdls(&[("accounts", ACCOUNTS_V1), ("reviews", REVIEWS_V1)])
        .into_result()
        .unwrap();

    assert!(supergraph
        .supergraph_sdl()
        .contains("  @join__type(graph: REVIEWS, key: \"id\", extension: true)\n"));
}

#[test]
fn composition_is_deterministic() {
    let header = fed2(r#""@key", "@tag", "@authenticated""#);
    let a = format!(
        r#"{header}
        type Query {{ me: User }}
        type User @key(fields: "id") @tag(name: "team-b") {{ id: ID! }}"#
    );
    let b = format!(
        r#"{header}
        type Query {{ users: [User] }}
        type User @key(fields: "id") @authenticated @tag(name: "team-a") {{ id: ID! }}"#
    );

    let first = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    let second = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    assert_eq!(first.supergraph_sdl(), second.supergraph_sdl());

    let reversed = compose_sdls(&[("b", &b), ("a", &a)]).into_result().unwrap();

    let consensus = |supergraph: &federation_composition::ComposedSupergraph| {
        supergraph
            .model()
            .type_definition("User")
            .unwrap()
            .directives
            .iter()
            .filter(|directive| !directive.is_join())
            .cloned()
            .collect::<Vec<_>>()
    };

    assert_eq!(consensus(&first), consensus(&reversed));
    assert!(first.supergraph_sdl().contains(
        "type User\n  @join__type(graph: A, key: \"id\")\n  @join__type(graph: B, key: \"id\")\n  @tag(name: \"team-a\")\n  @tag(name: \"team-b\")\n  @authenticated\n{\n"
    ));
    assert!(reversed
        .supergraph_sdl()
        .contains("type User\n  @join__type(graph: B, key: \"id\")\n  @join__type(graph: A, key: \"id\")\n"));
}

const UNRESOLVABLE_KEY: [(&str, &str); 2] = [
    (
        "a",
        r#"
        extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])
        type Query { a: A }
        type A @key(fields: "id") { id: ID! x: Int }
        "#,
    ),
    (
        "b",
        r#"
        extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])
        type A @key(fields: "id", resolvable: false) { id: ID! y: Int }
        "#,
    ),
];

#[test]
fn unsatisfiable_fields_fail_composition() {
    let result = compose_sdls(&UNRESOLVABLE_KEY);

    assert!(result.supergraph().is_none());
    assert_eq!(
        result.diagnostics().error_codes().collect::<Vec<_>>(),
        [ErrorCode::SatisfiabilityError]
    );

    let json = result.errors_json();
    assert_eq!(json["errors"][0]["extensions"]["code"], "SATISFIABILITY_ERROR");
}

#[test]
fn satisfiability_can_be_disabled() {
    let options: CompositionOptions = toml::from_str("run_satisfiability = false").unwrap();

    let supergraph = compose_with_options(&subgraphs(&UNRESOLVABLE_KEY), &options)
        .into_result()
        .unwrap();

    assert!(supergraph
        .supergraph_sdl()
        .contains("  @join__type(graph: B, key: \"id\", resolvable: false)\n"));
}

#[test]
fn warnings_can_be_made_fatal() {
    let sdl = format!(
        r#"{}
        type Query {{ hello: String @override(from: "nowhere") }}"#,
        fed2(r#""@override""#)
    );
    let sdls = [("greetings", sdl.as_str())];

    let lenient = compose_sdls(&sdls);
    assert!(lenient.supergraph().is_some());
    assert_eq!(lenient.diagnostics().iter_warnings().count(), 1);

    let options = CompositionOptions {
        warnings_are_fatal: true,
        ..Default::default()
    };
    let strict = compose_with_options(&subgraphs(&sdls), &options);

    assert!(strict.supergraph().is_none());
    assert_eq!(
        strict.diagnostics().error_codes().collect::<Vec<_>>(),
        [ErrorCode::FromSubgraphDoesNotExist]
    );
}

#[test]
fn kind_mismatches_abort_the_merge() {
    let result = compose_sdls(&[
        ("a", "type Query { node: Node } type Node { id: ID! }"),
        ("b", "interface Node { id: ID! }"),
    ]);

    assert!(result.supergraph().is_none());
    assert_eq!(
        result.diagnostics().error_codes().collect::<Vec<_>>(),
        [ErrorCode::TypeKindMismatch]
    );
}

#[rstest]
#[case::on_the_interface(
    "interface Node @authenticated { id: ID! }",
    r#"[a] Invalid use of @authenticated on interface "Node": @authenticated cannot be applied on interfaces, interface objects or their fields"#
)]
#[case::on_an_interface_field(
    "interface Node { id: ID! @authenticated }",
    r#"[a] Invalid use of @authenticated on field "Node.id": @authenticated cannot be applied on interfaces, interface objects or their fields"#
)]
fn auth_requirements_stay_off_interfaces(#[case] interface: &str, #[case] expected: &str) {
    let a = format!(
        r#"{}
        type Query {{ node: Node }}
        {interface}
        type User implements Node {{ id: ID! }}"#,
        fed2(r#""@authenticated""#)
    );

    let result = compose_sdls(&[("a", &a)]);

    assert!(result.supergraph().is_none());
    assert_eq!(
        errors(result.diagnostics(), ErrorCode::AuthRequirementsAppliedOnInterface),
        [expected]
    );
}

#[rstest]
#[case::v1("", "", &[])]
#[case::v2(
    r#"extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])"#,
    r#"extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@external"])"#,
    &[r#"[b] Field "Product.name" is marked @external but is not used in any federation directive (@key, @provides, @requires) or to satisfy an interface; the field declaration has no use and should be removed (or the field should not be @external)."#]
)]
fn type_level_external_is_a_v2_feature(#[case] a_header: &str, #[case] b_header: &str, #[case] expected: &[&str]) {
    let a = format!(
        r#"{a_header}
        type Query {{ product: Product }}
        type Product @key(fields: "id") {{ id: ID! name: String }}"#
    );
    let b = format!(
        r#"{b_header}
        type Product @key(fields: "id") @external {{ id: ID! name: String }}"#
    );

    let result = compose_sdls(&[("a", &a), ("b", &b)]);

    assert_eq!(errors(result.diagnostics(), ErrorCode::ExternalUnused), expected);
    assert_eq!(result.supergraph().is_some(), expected.is_empty());
}

#[rstest]
#[case::v1(
    ACCOUNTS_V1,
    r#"extend type User @key(fields: "id") { id: ID! @external name: String @external reviews: [String] }"#,
    &[]
)]
#[case::v2(
    ACCOUNTS_V2,
    r#"
    extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@external"])
    type User @key(fields: "id") { id: ID! name: String @external reviews: [String] }
    "#,
    &[r#"[reviews] Field "User.name" is marked @external but is not used in any federation directive (@key, @provides, @requires) or to satisfy an interface; the field declaration has no use and should be removed (or the field should not be @external)."#]
)]
fn unused_externals_are_only_rejected_in_v2(#[case] accounts: &str, #[case] reviews: &str, #[case] expected: &[&str]) {
    let result = compose_sdls(&[("accounts", accounts), ("reviews", reviews)]);

    assert_eq!(errors(result.diagnostics(), ErrorCode::ExternalUnused), expected);
    assert_eq!(result.supergraph().is_some(), expected.is_empty());
}

#[test]
fn non_shareable_fields_cannot_be_resolved_twice() {
    let header = fed2(r#""@key""#);
    let a = format!("{header}\ntype Query {{ hello: String }}");
    let b = format!("{header}\ntype Query {{ hello: String }}");

    let result = compose_sdls(&[("a", &a), ("b", &b)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::InvalidFieldSharing),
        [r#"Non-shareable field "Query.hello" is resolved from multiple subgraphs: it is resolved from subgraphs "a" and "b" and defined as non-shareable in all of them"#]
    );
}

#[test]
fn subscription_fields_cannot_be_shared() {
    let header = fed2(r#""@shareable""#);
    let a = format!(
        r#"{header}
        type Query {{ hello: String }}
        type Subscription {{ ticks: Int @shareable }}"#
    );
    let b = format!(
        r#"{header}
        type Subscription {{ ticks: Int @shareable }}"#
    );

    let result = compose_sdls(&[("a", &a), ("b", &b)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::InvalidFieldSharing),
        [r#"Fields on root level subscription object cannot be marked as shareable: "Subscription.ticks" is resolved from subgraphs "a" and "b""#]
    );
}

fn media_subgraph() -> String {
    format!(
        r#"{}
        type Query {{ media: [Media] }}
        interface Media @key(fields: "id") {{ id: ID! title: String }}
        type Book implements Media @key(fields: "id") {{ id: ID! title: String }}"#,
        fed2(r#""@key""#)
    )
}

#[test]
fn interface_objects_add_fields_to_every_implementation() {
    let reviews = format!(
        r#"{}
        type Media @key(fields: "id") @interfaceObject {{ id: ID! reviews: [String] }}"#,
        fed2(r#""@key", "@interfaceObject""#)
    );

    let result = compose_sdls(&[("media", &media_subgraph()), ("reviews", &reviews)]);
    let errors: Vec<&str> = result.diagnostics().iter_errors().collect();
    assert!(errors.is_empty(), "{errors:#?}");

    let supergraph = result.into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(sdl.contains("interface Media\n"), "{sdl}");
    assert!(
        sdl.contains("  @join__type(graph: REVIEWS, key: \"id\", isInterfaceObject: true)\n"),
        "{sdl}"
    );

    let TypeDefinitionKind::Object { fields, .. } = &supergraph.model().type_definition("Book").unwrap().kind else {
        unreachable!("Book is an object type");
    };
    assert!(fields.iter().any(|field| field.name == "reviews"), "{fields:?}");
}

#[test]
fn interface_objects_share_fields_with_implementations() {
    let extra = format!(
        r#"{}
        type Media @key(fields: "id") @interfaceObject {{ id: ID! title: String }}"#,
        fed2(r#""@key", "@interfaceObject""#)
    );

    let result = compose_sdls(&[("media", &media_subgraph()), ("extra", &extra)]);

    assert!(result.supergraph().is_none());
    assert_eq!(
        errors(result.diagnostics(), ErrorCode::InvalidFieldSharing),
        [r#"Non-shareable field "Book.title" is resolved from multiple subgraphs: it is resolved from subgraphs "media" and "extra" and defined as non-shareable in all of them"#]
    );
}

#[test]
fn interface_keys_must_be_on_every_implementation() {
    let a = format!(
        r#"{}
        type Query {{ media: [Media] }}
        interface Media @key(fields: "id") {{ id: ID! }}
        type Book implements Media @key(fields: "id") {{ id: ID! }}
        type Movie implements Media {{ id: ID! }}"#,
        fed2(r#""@key""#)
    );

    let result = compose_sdls(&[("a", &a)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::InterfaceKeyNotOnImplementation),
        [r#"[a] Key @key(fields: "id") on interface type "Media" is missing on implementation type "Movie"."#]
    );
}

#[test]
fn argument_types_must_be_compatible() {
    let header = fed2(r#""@shareable""#);
    let a = format!("{header}\ntype Query {{ user(id: ID!): String @shareable }}");
    let b = format!("{header}\ntype Query {{ user(id: Int!): String @shareable }}");

    let result = compose_sdls(&[("a", &a), ("b", &b)]);

    assert!(result.supergraph().is_none());
    assert_eq!(
        errors(result.diagnostics(), ErrorCode::FieldArgumentTypeMismatch),
        [r#"Type of argument "Query.user(id:)" is incompatible across subgraphs: it has type "ID!" in subgraph "a" but type "Int!" in subgraph "b""#]
    );
}

#[test]
fn visible_interface_fields_need_visible_implementations() {
    let a = format!(
        r#"{}
        type Query {{ node: Node }}
        interface Node {{ id: ID! }}
        type User implements Node {{ id: ID! @inaccessible name: String }}"#,
        fed2(r#""@inaccessible""#)
    );

    let result = compose_sdls(&[("a", &a)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::ImplementedByInaccessible),
        [r#"Field "User.id" is @inaccessible but implements the interface field "Node.id", which is in the API schema."#]
    );
}

#[rstest]
#[case::same_arguments(r#"["first"]"#, &[])]
#[case::other_arguments(
    r#"["last"]"#,
    &[r#"Slicing arguments ["last"] of @listSize on "U.items" do not match the slicing arguments ["first"] of the interface field "Node.items""#]
)]
fn implementations_slice_like_their_interface(#[case] implementation_slicing: &str, #[case] expected: &[&str]) {
    let a = format!(
        r#"{}
        type Query {{ node: Node }}
        interface Node {{ items(first: Int): [Int] @listSize(slicingArguments: ["first"]) }}
        type U implements Node {{
          items(first: Int, last: Int): [Int] @listSize(slicingArguments: {implementation_slicing})
        }}"#,
        fed2(r#""@listSize""#)
    );

    let result = compose_sdls(&[("a", &a)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::ListSizeInvalidSlicingArgument),
        expected
    );
}

#[rstest]
#[case::cost_weight(
    r#""@cost""#,
    r#"@cost(weight: "abc")"#,
    ErrorCode::DirectiveCostInvalidWeight,
    "[a] Invalid @cost directive at Query.books: "
)]
#[case::negative_assumed_size(
    r#""@listSize""#,
    "@listSize(assumedSize: -1)",
    ErrorCode::ListSizeInvalidAssumedSize,
    "[a] Invalid @listSize directive at Query.books: "
)]
fn malformed_cost_arguments(
    #[case] imports: &str,
    #[case] directive: &str,
    #[case] code: ErrorCode,
    #[case] expected_prefix: &str,
) {
    let a = format!("{}\ntype Query {{ books: [Int] {directive} }}", fed2(imports));

    let result = compose_sdls(&[("a", &a)]);
    let errors = errors(result.diagnostics(), code);

    assert!(result.supergraph().is_none());
    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert!(errors[0].starts_with(expected_prefix), "{errors:#?}");
}

#[test]
fn cost_on_interface_fields_is_rejected() {
    let a = format!(
        r#"{}
        type Query {{ node: Node }}
        interface Node {{ id: ID! @cost(weight: 1) }}
        type User implements Node {{ id: ID! }}"#,
        fed2(r#""@cost""#)
    );

    let result = compose_sdls(&[("a", &a)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::CostAppliedToInterfaceField),
        [r#"[a] @cost cannot be applied to interface "Node.id""#]
    );
}

#[test]
fn the_highest_cost_wins() {
    let header = fed2(r#""@shareable", "@cost""#);
    let a = format!("{header}\ntype Query {{ books: [Int] @shareable @cost(weight: 2) }}");
    let b = format!("{header}\ntype Query {{ books: [Int] @shareable @cost(weight: 5) }}");

    let supergraph = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(sdl.contains("@cost(weight: 5)"), "{sdl}");
    assert!(!sdl.contains("@cost(weight: 2)"), "{sdl}");
}

#[rstest]
#[case::directive_to_type(
    r#"{name: "@key", as: "id"}"#,
    r#"[a] Invalid @link import renaming: directive "@key" imported name should start with a '@' character, but got "id"."#
)]
#[case::type_to_directive(
    r#"{name: "FieldSet", as: "@fieldSet"}"#,
    r#"[a] Invalid @link import renaming: type "FieldSet" imported name should not start with a '@' character, but got "@fieldSet"."#
)]
fn link_imports_keep_their_kind(#[case] import: &str, #[case] expected: &str) {
    let a = format!("{}\ntype Query {{ hello: String }}", fed2(import));

    let result = compose_sdls(&[("a", &a)]);

    assert!(result.supergraph().is_none());
    assert_eq!(errors(result.diagnostics(), ErrorCode::LinkImportNameMismatch), [expected]);
}

#[test]
fn imported_directives_can_be_renamed() {
    let header = fed2(r#"{name: "@key", as: "@id"}"#);
    let a = format!(
        r#"{header}
        type Query {{ me: User }}
        type User @id(fields: "id") {{ id: ID! }}"#
    );
    let b = format!(
        r#"{header}
        type User @id(fields: "id") {{ id: ID! name: String }}"#
    );

    let supergraph = compose_sdls(&[("a", &a), ("b", &b)]).into_result().unwrap();
    let sdl = supergraph.supergraph_sdl();

    assert!(
        sdl.contains("type User\n  @join__type(graph: A, key: \"id\")\n  @join__type(graph: B, key: \"id\")\n"),
        "{sdl}"
    );
}

#[test]
fn enums_in_both_positions_need_the_same_values() {
    let header = fed2(r#""@key""#);
    let a = format!(
        r#"{header}
        type Query {{ paint(color: Color): Color }}
        enum Color {{ RED GREEN }}"#
    );
    let b = format!(
        r#"{header}
        type Query {{ repaint(color: Color): Color }}
        enum Color {{ RED BLUE }}"#
    );

    let result = compose_sdls(&[("a", &a), ("b", &b)]);

    assert_eq!(
        errors(result.diagnostics(), ErrorCode::EnumValueMismatch),
        [
            r#"Enum type "Color" is used as both input type and output type, but value "GREEN" is not defined in all the subgraphs defining "Color": "GREEN" is defined in subgraph "a" but not in subgraph "b""#,
            r#"Enum type "Color" is used as both input type and output type, but value "BLUE" is not defined in all the subgraphs defining "Color": "BLUE" is defined in subgraph "b" but not in subgraph "a""#,
        ]
    );
}

#[rstest]
#[case::resolvable_key("", true)]
#[case::unresolvable_key(", resolvable: false", false)]
fn progressive_overrides_are_checked_with_the_label_active(#[case] key_arguments: &str, #[case] composes: bool) {
    let header = fed2(r#""@key", "@override""#);
    let original = format!(
        r#"{header}
        type Query {{ products: [Product] }}
        type Product @key(fields: "id") {{ id: ID! price: Int }}"#
    );
    let new = format!(
        r#"{header}
        type Product @key(fields: "id"{key_arguments}) {{
          id: ID!
          price: Int @override(from: "original", label: "percent(10)")
        }}"#
    );

    let result = compose_sdls(&[("original", &original), ("new", &new)]);
    let unsatisfiable = errors(result.diagnostics(), ErrorCode::SatisfiabilityError);

    if composes {
        assert!(unsatisfiable.is_empty(), "{unsatisfiable:#?}");
        assert!(result.supergraph().is_some());
    } else {
        assert_eq!(unsatisfiable.len(), 1, "{unsatisfiable:#?}");
        assert!(
            unsatisfiable[0].contains(
                r#"field "Product.price" is only resolved by subgraph "original" when the override label "percent(10)" is inactive"#
            ),
            "{unsatisfiable:#?}"
        );
    }
}
