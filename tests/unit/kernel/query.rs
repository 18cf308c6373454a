use super::*;

#[test]
fn negate_sets_flag_on_leaves_only() {
    let pattern = QueryNode::literal("a.b").negate();
    assert_eq!(
        pattern,
        QueryNode::Pattern {
            value: "a.b".to_string(),
            negated: true,
            is_literal: true,
        }
    );

    let op = QueryNode::and(vec![QueryNode::pattern("x")]);
    assert_eq!(op.clone().negate(), op);
}

#[test]
fn case_parameter_is_found_in_nested_operators() {
    let nodes = vec![QueryNode::and(vec![
        QueryNode::pattern("foo"),
        QueryNode::or(vec![QueryNode::param(Field::Case, "YES")]),
    ])];
    assert!(is_case_sensitive(&nodes));

    let nodes = vec![QueryNode::param(Field::Case, "no")];
    assert!(!is_case_sensitive(&nodes));
}

#[test]
fn other_parameters_do_not_enable_case_sensitivity() {
    let nodes = vec![
        QueryNode::param(Field::Author, "yes"),
        QueryNode::param(Field::Other("case".to_string()), "yes"),
        QueryNode::pattern("yes"),
    ];
    assert!(!is_case_sensitive(&nodes));
}

#[test]
fn query_nodes_deserialize_from_json() {
    let json = r#"[
        {"node": "operator", "kind": "and", "operands": [
            {"node": "pattern", "value": "fix", "isLiteral": true},
            {"node": "parameter", "field": "author", "value": "alice", "negated": true}
        ]}
    ]"#;
    let nodes: Vec<QueryNode> = serde_json::from_str(json).unwrap();
    assert_eq!(
        nodes,
        vec![QueryNode::and(vec![
            QueryNode::literal("fix"),
            QueryNode::param(Field::Author, "alice").negate(),
        ])]
    );
}

#[test]
fn field_display_matches_query_syntax() {
    assert_eq!(Field::Committer.to_string(), "committer");
    assert_eq!(Field::Other("visibility".to_string()).to_string(), "visibility");
}
