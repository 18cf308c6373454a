use super::*;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn predicate_json_shape() {
    let pred = Predicate::and(vec![
        Predicate::not(Predicate::message_matches("fix", true)),
        Predicate::DiffModifiesFile {
            expr: r"\.go$".to_string(),
            ignore_case: true,
        },
    ]);

    assert_eq!(
        serde_json::to_value(&pred).unwrap(),
        json!({
            "type": "and",
            "children": [
                {"type": "not", "child": {"type": "messageMatches", "expr": "fix", "ignoreCase": true}},
                {"type": "diffModifiesFile", "expr": "\\.go$", "ignoreCase": true}
            ]
        })
    );
}

#[test]
fn search_request_round_trips_through_json() {
    let time = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
    let request = SearchRequest {
        repo: "github.com/acme/widgets".to_string(),
        revisions: vec![
            RevisionSpecifier::rev_spec("HEAD"),
            RevisionSpecifier::ref_glob("refs/heads/*"),
            RevisionSpecifier::exclude_ref_glob("refs/heads/tmp-*"),
        ],
        query: Predicate::or(vec![
            Predicate::CommitBefore { time },
            Predicate::CommitAfter { time },
            Predicate::AuthorMatches {
                expr: "alice".to_string(),
                ignore_case: false,
            },
        ]),
        include_diff: true,
        limit: 50,
    };

    let encoded = serde_json::to_string(&request).unwrap();
    let decoded: SearchRequest = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, request);

    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["revisions"][0], json!({"revSpec": "HEAD"}));
    assert_eq!(value["includeDiff"], json!(true));
}

#[test]
fn size_counts_every_node() {
    let pred = Predicate::and(vec![
        Predicate::not(Predicate::diff_matches("a", false)),
        Predicate::or(vec![]),
    ]);
    assert_eq!(pred.size(), 4);
}
