//! Working-directory history with back/forward support.

use std::collections::VecDeque;

use crate::path::DsuPath;

/// Default number of directories remembered on the back stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Immutable navigation history with back/forward stacks.
///
/// Every mutation returns a **new** `History`. Changing directory pushes the
/// directory being left; pushing clears the forward stack (same semantics as
/// a web browser). The back stack is capped; the oldest entries fall off.
#[derive(Debug, Clone)]
pub struct History {
    back_stack: VecDeque<DsuPath>,
    forward_stack: Vec<DsuPath>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Creates an empty history with the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history remembering at most `limit` directories.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            back_stack: VecDeque::new(),
            forward_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records `left` (the directory being left) and clears the forward
    /// stack. Returns a new `History`.
    pub fn push(&self, left: DsuPath) -> Self {
        let mut back_stack = self.back_stack.clone();
        back_stack.push_back(left);
        while back_stack.len() > self.limit {
            back_stack.pop_front();
        }
        Self {
            back_stack,
            forward_stack: Vec::new(),
            limit: self.limit,
        }
    }

    /// Goes back one step from `current`. Returns the new history and the
    /// directory to change to, or `None` if there is nothing to go back to.
    pub fn go_back(&self, current: &DsuPath) -> Option<(Self, DsuPath)> {
        let mut back_stack = self.back_stack.clone();
        let target = back_stack.pop_back()?;
        let mut forward_stack = self.forward_stack.clone();
        forward_stack.push(current.clone());
        Some((
            Self {
                back_stack,
                forward_stack,
                limit: self.limit,
            },
            target,
        ))
    }

    /// Goes forward one step from `current`. Returns the new history and the
    /// directory to change to, or `None` if the forward stack is empty.
    pub fn go_forward(&self, current: &DsuPath) -> Option<(Self, DsuPath)> {
        let mut forward_stack = self.forward_stack.clone();
        let target = forward_stack.pop()?;
        let mut back_stack = self.back_stack.clone();
        back_stack.push_back(current.clone());
        Some((
            Self {
                back_stack,
                forward_stack,
                limit: self.limit,
            },
            target,
        ))
    }

    /// Drops every remembered directory at or below `removed`.
    pub fn forget(&self, removed: &DsuPath) -> Self {
        Self {
            back_stack: self
                .back_stack
                .iter()
                .filter(|p| !p.starts_with(removed))
                .cloned()
                .collect(),
            forward_stack: self
                .forward_stack
                .iter()
                .filter(|p| !p.starts_with(removed))
                .cloned()
                .collect(),
            limit: self.limit,
        }
    }

    /// Returns `true` if there is at least one entry on the back stack.
    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    /// Returns `true` if there is at least one entry on the forward stack.
    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> DsuPath {
        DsuPath::new(s).unwrap()
    }

    #[test]
    fn new_history_is_empty() {
        let history = History::new();
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn push_does_not_mutate_original() {
        let history = History::new();
        let _new_history = history.push(p("/home"));

        assert!(!history.can_go_back());
    }

    #[test]
    fn go_back_returns_left_directory() {
        let history = History::new().push(DsuPath::root());

        let (history, target) = history.go_back(&p("/docs")).unwrap();

        assert_eq!(target, DsuPath::root());
        assert!(!history.can_go_back());
        assert!(history.can_go_forward());
    }

    #[test]
    fn go_forward_returns_to_where_back_started() {
        let history = History::new().push(DsuPath::root());
        let (history, here) = history.go_back(&p("/docs")).unwrap();

        let (history, target) = history.go_forward(&here).unwrap();

        assert_eq!(target, p("/docs"));
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn empty_stacks_return_none() {
        let history = History::new();
        assert!(history.go_back(&DsuPath::root()).is_none());
        assert!(history.go_forward(&DsuPath::root()).is_none());
    }

    #[test]
    fn push_clears_forward_stack() {
        let history = History::new().push(p("/a")).push(p("/b"));
        let (history, _) = history.go_back(&p("/c")).unwrap();
        assert!(history.can_go_forward());

        let history = history.push(p("/b"));
        assert!(!history.can_go_forward());
        assert!(history.can_go_back());
    }

    #[test]
    fn limit_drops_oldest() {
        let history = History::with_limit(2)
            .push(p("/a"))
            .push(p("/b"))
            .push(p("/c"));

        let (history, first) = history.go_back(&p("/d")).unwrap();
        let (history, second) = history.go_back(&first).unwrap();

        assert_eq!(first, p("/c"));
        assert_eq!(second, p("/b"));
        assert!(!history.can_go_back());
    }

    #[test]
    fn forget_removes_deleted_subtree() {
        let history = History::new().push(p("/a")).push(p("/a/b")).push(p("/c"));

        let history = history.forget(&p("/a"));

        let (history, target) = history.go_back(&p("/x")).unwrap();
        assert_eq!(target, p("/c"));
        assert!(!history.can_go_back());
    }
}
