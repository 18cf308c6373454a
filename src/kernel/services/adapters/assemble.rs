//! Protocol matches to caller-facing commit matches.

use crate::kernel::commit::{Commit, CommitMatch, RepoName};
use crate::kernel::highlight::{HighlightedString, Location, Range};
use crate::kernel::services::ports::protocol::{MatchedContent, ProtocolCommitMatch};

pub const DIFF_PREAMBLE: &str = "```diff\n";
pub const MESSAGE_PREAMBLE: &str = "```COMMIT_EDITMSG\n";
const FENCE_END: &str = "\n```";

pub fn assemble(m: ProtocolCommitMatch, diff: bool, repo: &RepoName) -> CommitMatch {
    let body = if diff {
        fenced_body(DIFF_PREAMBLE, &m.diff)
    } else {
        fenced_body(MESSAGE_PREAMBLE, &m.message)
    };

    let diff_preview = diff.then(|| preview(&m.diff));
    let message_preview = Some(preview(&m.message));

    CommitMatch {
        commit: Commit {
            id: m.oid,
            author: m.author,
            committer: Some(m.committer),
            message: m.message.content,
            parents: m.parents,
        },
        repo: repo.clone(),
        message_preview,
        diff_preview,
        body,
    }
}

pub fn assemble_all(
    matches: Vec<ProtocolCommitMatch>,
    diff: bool,
    repo: &RepoName,
) -> Vec<CommitMatch> {
    matches
        .into_iter()
        .map(|m| assemble(m, diff, repo))
        .collect()
}

fn preview(content: &MatchedContent) -> HighlightedString {
    HighlightedString::new(content.content.clone(), &content.matched_ranges)
}

/// Wraps `content` in a markdown fence and moves its ranges below the
/// opening line.
fn fenced_body(preamble: &str, content: &MatchedContent) -> HighlightedString {
    let mut value =
        String::with_capacity(preamble.len() + content.content.len() + FENCE_END.len());
    value.push_str(preamble);
    value.push_str(&content.content);
    value.push_str(FENCE_END);

    let shift = Location::new(preamble.len(), 1, 0);
    let ranges = Range::add_all(&content.matched_ranges, shift);
    HighlightedString::new(value, &ranges)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/assemble.rs"]
mod tests;
