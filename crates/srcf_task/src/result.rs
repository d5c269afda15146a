//! The `Result`/`State` tree value type and its builder.
//!
//! Every plumbing primitive returns a [`TaskResult<T>`]: a tree node
//! carrying an aggregated [`State`], an optional typed value, and the
//! erased outcomes of whatever child steps it composed out of. Composite
//! tasks accumulate children with a [`ResultBuilder`] rather than the
//! generator-based `Result.collect` decorator of the original Python — an
//! explicit `push`/`finish` pair in place of a coroutine protocol.

use std::fmt;

use crate::state::State;

/// A child outcome whose value has been erased to its `Debug` rendering,
/// kept only for building the indented report tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub state: State,
    pub detail: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write_line(f, depth, &self.name, self.state, self.detail.as_deref())?;
        for child in &self.children {
            writeln!(f)?;
            child.fmt_at(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

fn write_line(
    f: &mut fmt::Formatter<'_>,
    depth: usize,
    name: &str,
    state: State,
    detail: Option<&str>,
) -> fmt::Result {
    write!(f, "{}{name}: {state}", "  ".repeat(depth))?;
    if let Some(detail) = detail {
        write!(f, " {detail}")?;
    }
    Ok(())
}

/// A tree node with a state, an optional typed value, the qualified name
/// of the producing task, and the erased outcomes of its children.
///
/// Truthiness collapses to "was anything changed": [`TaskResult::changed`]
/// is `false` only for [`State::Unchanged`].
#[derive(Debug, Clone)]
pub struct TaskResult<T> {
    name: String,
    state: State,
    value: Option<T>,
    children: Vec<Node>,
}

impl<T> TaskResult<T> {
    /// A leaf result: no children, just a name/state/value.
    pub fn new(name: impl Into<String>, state: State, value: T) -> Self {
        Self {
            name: name.into(),
            state,
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// A leaf `unchanged` result carrying no value.
    pub fn unchanged(name: impl Into<String>) -> TaskResult<()> {
        TaskResult {
            name: name.into(),
            state: State::Unchanged,
            value: Some(()),
            children: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// `unchanged` is false, `success`/`created` are true.
    pub fn changed(&self) -> bool {
        self.state != State::Unchanged
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-tag the value without touching state or children.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TaskResult<U> {
        TaskResult {
            name: self.name,
            state: self.state,
            value: self.value.map(f),
            children: self.children,
        }
    }
}

impl<T: fmt::Debug> fmt::Display for TaskResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.value.as_ref().map(|v| format!("{v:?}"));
        write_line(f, 0, &self.name, self.state, detail.as_deref())?;
        for child in &self.children {
            writeln!(f)?;
            child.fmt_at(f, 1)?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> TaskResult<T> {
    /// Flatten this result (erasing its value to its `Debug` rendering)
    /// into the same [`Node`] shape its children are already kept in —
    /// used by callers (the job runner's `job_log` writer) that want to
    /// walk a whole completed task's tree uniformly.
    pub fn to_node(&self) -> Node {
        Node {
            name: self.name.clone(),
            state: self.state,
            detail: self.value.as_ref().map(|v| format!("{v:?}")),
            children: self.children.clone(),
        }
    }
}

/// Accumulates child results for a composite task: `push` folds a child's
/// state into the running aggregate and hands back its value, `finish`
/// consumes the accumulator into a [`TaskResult`] carrying the composite's
/// own value and the aggregated state (unless overridden).
#[derive(Debug, Default)]
pub struct ResultBuilder {
    state: State,
    children: Vec<Node>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self {
            state: State::Unchanged,
            children: Vec::new(),
        }
    }

    /// Record a child result, folding its state into the aggregate and
    /// returning its value for the caller to branch on.
    pub fn push<T: fmt::Debug>(
        &mut self,
        name: impl Into<String>,
        child: TaskResult<T>,
    ) -> Option<T> {
        self.state = self.state.max(child.state);
        let detail = child.value.as_ref().map(|v| format!("{v:?}"));
        self.children.push(Node {
            name: name.into(),
            state: child.state,
            detail,
            children: child.children,
        });
        child.value
    }

    /// Record a side-effect-only child whose value isn't needed downstream.
    pub fn step<T: fmt::Debug>(&mut self, name: impl Into<String>, child: TaskResult<T>) {
        self.push(name, child);
    }

    /// The aggregate of every child pushed so far.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn finish<T>(self, name: impl Into<String>, value: T) -> TaskResult<T> {
        TaskResult {
            name: name.into(),
            state: self.state,
            value: Some(value),
            children: self.children,
        }
    }

    /// Finish with an explicitly chosen state instead of the aggregated one.
    pub fn finish_with_state<T>(self, name: impl Into<String>, state: State, value: T) -> TaskResult<T> {
        TaskResult {
            name: name.into(),
            state,
            value: Some(value),
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_is_max_of_children() {
        let mut builder = ResultBuilder::new();
        builder.step("ensure_group", TaskResult::new("ensure_group", State::Unchanged, ()));
        builder.step("ensure_user", TaskResult::new("ensure_user", State::Created, ()));
        let result = builder.finish("create_member", "spqr2");
        assert_eq!(result.state(), State::Created);
        assert!(result.changed());
    }

    #[test]
    fn all_unchanged_children_stay_unchanged() {
        let mut builder = ResultBuilder::new();
        builder.step("a", TaskResult::new("a", State::Unchanged, ()));
        builder.step("b", TaskResult::new("b", State::Unchanged, ()));
        let result = builder.finish("noop", ());
        assert_eq!(result.state(), State::Unchanged);
        assert!(!result.changed());
    }

    #[test]
    fn push_returns_child_value_for_branching() {
        let mut builder = ResultBuilder::new();
        let password = builder.push("ensure_user", TaskResult::new("ensure_user", State::Created, "hunter2"));
        assert_eq!(password, Some("hunter2"));
    }

    #[test]
    fn display_renders_indented_tree() {
        let mut builder = ResultBuilder::new();
        builder.step("ensure_group", TaskResult::new("ensure_group", State::Unchanged, ()));
        builder.step("ensure_user", TaskResult::new("ensure_user", State::Created, ()));
        let result = builder.finish("create_member", ());
        let rendered = result.to_string();
        assert!(rendered.starts_with("create_member: created"));
        assert!(rendered.contains("  ensure_group: unchanged"));
        assert!(rendered.contains("  ensure_user: created"));
    }
}
