//! Open-definition stacks and the differ between consecutive stacks.
//!
//! coqtop reports the names of the definitions that are currently open as a
//! pipe-delimited token in its prompt (`|Foo|Bar|`). This module turns that
//! token into a [`DefinitionStack`] and computes what changed between two
//! consecutive prompts.

use std::fmt;

use serde::Serialize;

/// Name coqtop gives to every anonymous proof branch.
///
/// Several open branches can carry this same name, so stacks made only of
/// it cannot be compared by value.
pub const BRANCH_PLACEHOLDER: &str = "branch";

/// Ordered list of definition names open at one point of a script.
///
/// An empty stack is the root (top level). Equality and hashing are
/// structural over the names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DefinitionStack {
    names: Vec<String>,
    #[serde(skip)]
    all_placeholders: bool,
}

impl Default for DefinitionStack {
    fn default() -> Self {
        Self::root()
    }
}

impl DefinitionStack {
    /// The root stack.
    #[must_use]
    pub fn root() -> Self {
        Self::from_names(Vec::<String>::new())
    }

    /// Build a stack from names, outermost first.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let all_placeholders = names.iter().all(|n| n == BRANCH_PLACEHOLDER);
        Self {
            names,
            all_placeholders,
        }
    }

    /// Parse the pipe-delimited prompt token. Empty segments are dropped, so
    /// `"||"` and `""` are both the root.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Self::from_names(token.split('|').map(str::trim).filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True when every name is [`BRANCH_PLACEHOLDER`]. Vacuously true for the
    /// root.
    #[must_use]
    pub fn is_all_placeholders(&self) -> bool {
        self.all_placeholders
    }

    /// Compute what was removed, kept, and added going from `self` to `next`.
    ///
    /// Names are compared by value, keeping each side's order. When both
    /// stacks consist only of anonymous branches the comparison is done index
    /// by index instead.
    #[must_use]
    pub fn diff(&self, next: &Self) -> StackDiff {
        if self.all_placeholders && next.all_placeholders {
            return self.diff_by_position(next);
        }

        StackDiff {
            removed: self
                .names
                .iter()
                .filter(|n| !next.names.contains(*n))
                .cloned()
                .collect(),
            shared: self
                .names
                .iter()
                .filter(|n| next.names.contains(*n))
                .cloned()
                .collect(),
            added: next
                .names
                .iter()
                .filter(|n| !self.names.contains(*n))
                .cloned()
                .collect(),
        }
    }

    // Assumes both stacks describe the same nesting index for index. Branches
    // opening and closing at uneven rates are not told apart.
    fn diff_by_position(&self, next: &Self) -> StackDiff {
        let mut diff = StackDiff::default();
        let depth = self.names.len().max(next.names.len());

        for i in 0..depth {
            match (self.names.get(i), next.names.get(i)) {
                (Some(old), Some(_)) => diff.shared.push(old.clone()),
                (Some(old), None) => diff.removed.push(old.clone()),
                (None, Some(new)) => diff.added.push(new.clone()),
                (None, None) => {}
            }
        }

        diff
    }
}

impl fmt::Display for DefinitionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}|", self.names.join("|"))
    }
}

/// Result of [`DefinitionStack::diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDiff {
    /// Names open before but not after, in the previous stack's order.
    pub removed: Vec<String>,
    /// Names open both before and after, in the previous stack's order.
    pub shared: Vec<String>,
    /// Names open after but not before, in the current stack's order.
    pub added: Vec<String>,
}
