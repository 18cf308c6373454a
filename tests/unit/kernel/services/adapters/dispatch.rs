use super::*;
use crate::kernel::commit::RepoName;
use crate::kernel::services::ports::protocol::{MatchedContent, RevisionSpecifier, Signature};
use crate::kernel::services::ports::search::CollectingSink;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

#[derive(Clone)]
enum Behavior {
    Batches { batches: usize, per_batch: usize, limit_hit: bool },
    Fail(&'static str),
    Hang,
    Panic,
}

#[derive(Default)]
struct FakeClient {
    behaviors: HashMap<String, Behavior>,
    requests: Mutex<Vec<SearchRequest>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl FakeClient {
    fn with(behaviors: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            behaviors: behaviors
                .iter()
                .map(|(name, b)| (name.to_string(), b.clone()))
                .collect(),
            ..Default::default()
        })
    }

    fn requested_repos(&self) -> Vec<String> {
        let mut repos: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.repo.clone())
            .collect();
        repos.sort();
        repos
    }
}

#[async_trait::async_trait]
impl SearchClient for FakeClient {
    async fn search(
        &self,
        ctx: &CancellationToken,
        request: SearchRequest,
        on_matches: &mut (dyn FnMut(Vec<ProtocolCommitMatch>) + Send),
    ) -> Result<bool> {
        self.tokens.lock().unwrap().push(ctx.clone());
        let behavior = self
            .behaviors
            .get(&request.repo)
            .cloned()
            .unwrap_or(Behavior::Batches {
                batches: 1,
                per_batch: 1,
                limit_hit: false,
            });
        let repo = request.repo.clone();
        self.requests.lock().unwrap().push(request);

        match behavior {
            Behavior::Batches {
                batches,
                per_batch,
                limit_hit,
            } => {
                for b in 0..batches {
                    let batch: Vec<ProtocolCommitMatch> = (0..per_batch)
                        .map(|i| protocol_match(&format!("{repo}-{b}-{i}")))
                        .collect();
                    on_matches(batch);
                    tokio::task::yield_now().await;
                }
                Ok(limit_hit)
            }
            Behavior::Fail(msg) => Err(SearchError::Client(msg.to_string())),
            Behavior::Hang => {
                ctx.cancelled().await;
                Err(SearchError::Cancelled)
            }
            Behavior::Panic => panic!("backend exploded"),
        }
    }
}

fn protocol_match(oid: &str) -> ProtocolCommitMatch {
    let sig = Signature {
        name: "alice".to_string(),
        email: "alice@example.com".to_string(),
        date: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
    };
    ProtocolCommitMatch {
        oid: oid.to_string(),
        author: sig.clone(),
        committer: sig,
        message: MatchedContent {
            content: "fix".to_string(),
            matched_ranges: Vec::new(),
        },
        diff: MatchedContent::default(),
        parents: Vec::new(),
    }
}

fn repo(id: u32, name: &str) -> RepositoryRevisions {
    RepositoryRevisions::new(
        RepoName::new(id, name),
        vec![RevisionSpecifier::rev_spec("HEAD")],
    )
}

fn stats_events(sink: CollectingSink) -> Vec<SearchEvent> {
    sink.into_events()
        .into_iter()
        .filter(|e| e.results.is_empty())
        .collect()
}

#[test]
fn skips_repositories_without_revisions() {
    let rt = create_runtime();
    let client = FakeClient::with(&[]);
    let sink = Arc::new(CollectingSink::new());

    let repos = vec![
        repo(1, "a"),
        RepositoryRevisions::new(RepoName::new(2, "b"), Vec::new()),
        repo(3, "c"),
    ];
    let query = vec![QueryNode::pattern("fix")];

    rt.block_on(dispatch(
        client.clone(),
        repos,
        &query,
        &SearchOptions::default(),
        sink.clone(),
    ))
    .unwrap();

    assert_eq!(client.requested_repos(), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(sink.result_count(), 2);
}

#[test]
fn request_carries_compiled_query_and_options() {
    let rt = create_runtime();
    let client = FakeClient::with(&[]);
    let sink = Arc::new(CollectingSink::new());
    let options = SearchOptions {
        case_sensitive: false,
        diff: true,
        limit: 25,
    };
    let query = vec![
        QueryNode::pattern("foo"),
        QueryNode::param(crate::kernel::query::Field::Case, "yes"),
    ];

    rt.block_on(dispatch(client.clone(), vec![repo(1, "a")], &query, &options, sink))
        .unwrap();

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.repo, "a");
    assert_eq!(request.revisions, vec![RevisionSpecifier::rev_spec("HEAD")]);
    assert!(request.include_diff);
    assert_eq!(request.limit, 25);
    assert_eq!(
        request.query,
        Predicate::and(vec![Predicate::diff_matches("foo", false)])
    );
}

#[test]
fn every_task_reports_stats_including_limit_hit() {
    let rt = create_runtime();
    let client = FakeClient::with(&[(
        "full",
        Behavior::Batches {
            batches: 2,
            per_batch: 3,
            limit_hit: true,
        },
    )]);
    let sink = Arc::new(CollectingSink::new());

    rt.block_on(dispatch(
        client,
        vec![repo(1, "full"), repo(2, "other")],
        &[QueryNode::pattern("x")],
        &SearchOptions::default(),
        sink.clone(),
    ))
    .unwrap();

    assert_eq!(sink.result_count(), 7);
    let sink = Arc::try_unwrap(sink).ok().unwrap();
    let stats = stats_events(sink);
    assert_eq!(stats.len(), 2);
    assert_eq!(stats.iter().filter(|e| e.stats.is_limit_hit).count(), 1);
}

#[test]
fn first_failure_cancels_siblings_and_is_returned() {
    let rt = create_runtime();
    let client = FakeClient::with(&[
        ("slow-1", Behavior::Hang),
        ("bad", Behavior::Fail("shard unavailable")),
        ("slow-2", Behavior::Hang),
    ]);
    let sink = Arc::new(CollectingSink::new());

    let result = rt.block_on(async {
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            dispatch(
                client.clone(),
                vec![repo(1, "slow-1"), repo(2, "bad"), repo(3, "slow-2")],
                &[QueryNode::pattern("x")],
                &SearchOptions::default(),
                sink.clone(),
            ),
        )
        .await
    });

    let result = result.expect("dispatch must not hang after a failure");
    assert_eq!(
        result,
        Err(SearchError::Client("shard unavailable".to_string()))
    );
    for token in client.tokens.lock().unwrap().iter() {
        assert!(token.is_cancelled());
    }
    let sink = Arc::try_unwrap(sink).ok().unwrap();
    assert_eq!(stats_events(sink).len(), 3);
}

#[test]
fn parent_cancellation_stops_all_tasks() {
    let rt = create_runtime();
    let client = FakeClient::with(&[("a", Behavior::Hang), ("b", Behavior::Hang)]);
    let sink = Arc::new(CollectingSink::new());
    let parent = CancellationToken::new();

    let result = rt.block_on(async {
        let cancel = parent.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            cancel.cancel();
        });
        dispatch_with_cancel(
            client,
            vec![repo(1, "a"), repo(2, "b")],
            &[QueryNode::pattern("x")],
            &SearchOptions::default(),
            sink,
            &parent,
        )
        .await
    });

    assert_eq!(result, Err(SearchError::Cancelled));
}

#[test]
fn panicking_task_surfaces_as_task_failed() {
    let rt = create_runtime();
    let client = FakeClient::with(&[("boom", Behavior::Panic)]);
    let sink = Arc::new(CollectingSink::new());

    let result = rt.block_on(dispatch(
        client,
        vec![repo(1, "boom")],
        &[QueryNode::pattern("x")],
        &SearchOptions::default(),
        sink,
    ));

    assert!(matches!(result, Err(SearchError::TaskFailed(_))), "{result:?}");
}

#[test]
fn concurrent_repositories_deliver_every_match() {
    let rt = create_runtime();
    let behaviors: Vec<(String, Behavior)> = (0..40)
        .map(|i| {
            (
                format!("repo-{i}"),
                Behavior::Batches {
                    batches: 5,
                    per_batch: 4,
                    limit_hit: false,
                },
            )
        })
        .collect();
    let client = Arc::new(FakeClient {
        behaviors: behaviors.into_iter().collect(),
        ..Default::default()
    });
    let repos: Vec<_> = (0..40).map(|i| repo(i, &format!("repo-{i}"))).collect();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<SearchEvent>();

    rt.block_on(dispatch(
        client,
        repos,
        &[QueryNode::pattern("x")],
        &SearchOptions::default(),
        Arc::new(tx),
    ))
    .unwrap();

    let mut matches = 0;
    let mut stats = 0;
    let mut per_repo: HashMap<String, Vec<String>> = HashMap::new();
    while let Ok(event) = rx.try_recv() {
        if event.results.is_empty() {
            stats += 1;
        }
        for m in event.results {
            matches += 1;
            per_repo.entry(m.repo.name.clone()).or_default().push(m.commit.id);
        }
    }

    assert_eq!(matches, 40 * 5 * 4);
    assert_eq!(stats, 40);
    let ids = &per_repo["repo-7"];
    let expected: Vec<String> = (0..5)
        .flat_map(|b| (0..4).map(move |i| format!("repo-7-{b}-{i}")))
        .collect();
    assert_eq!(ids, &expected);
}

#[test]
fn empty_query_compiles_to_empty_and() {
    let pred = build_predicate(&[], &SearchOptions::default());
    assert_eq!(pred, Predicate::and(Vec::new()));
}
