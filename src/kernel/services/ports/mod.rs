//! Service ports: traits + data contracts.

pub mod protocol;
pub mod search;
pub mod settings;

pub use protocol::{
    MatchedContent, Predicate, ProtocolCommitMatch, RevisionSpecifier, SearchRequest, Signature,
};
pub use search::{
    CollectingSink, RepositoryRevisions, Result as SearchResult, SearchClient, SearchError,
    SearchEvent, SearchSink, Stats,
};
pub use settings::Settings;
