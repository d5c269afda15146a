//! The three-value outcome ladder every plumbing primitive and task reports.

use std::fmt;

/// Outcome of an idempotent operation, ordered `Unchanged < Success < Created`.
///
/// Declaration order doubles as the ordering used for aggregation: a
/// composite's state is the max of its parts' states unless set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// Nothing needed to change; the operation was already satisfied.
    Unchanged,
    /// An existing thing was modified.
    Success,
    /// The thing didn't exist before and was created.
    Created,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Unchanged => "unchanged",
            State::Success => "success",
            State::Created => "created",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_unchanged_success_created() {
        assert!(State::Unchanged < State::Success);
        assert!(State::Success < State::Created);
        assert_eq!(State::Unchanged.max(State::Created), State::Created);
    }
}
