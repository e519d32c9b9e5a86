//! Conditional routing: a predicate over post-merge state plus a
//! label → target branch map.

use std::sync::Arc;

use crate::state::SessionState;

/// Routing predicate: reads the post-merge state, returns a branch label.
pub type RoutePredicate = Arc<dyn Fn(&SessionState) -> String + Send + Sync>;

/// Branch map for one conditional edge.
///
/// Maps predicate labels to target node ids, with an optional designated
/// default for unmapped labels. An edge whose map is empty and has no
/// default is rejected at compile.
///
/// ```
/// use flowgraph::Branches;
///
/// let branches = Branches::new()
///     .on("创建待办", "create_task")
///     .on("查询待办", "list_tasks")
///     .otherwise("chat");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Branches {
    routes: Vec<(String, String)>,
    default: Option<String>,
}

impl Branches {
    /// Creates an empty branch map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `label` to `target`, builder style. The first mapping for a
    /// label wins.
    pub fn on(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.routes.push((label.into(), target.into()));
        self
    }

    /// Designates `target` as the default branch for unmapped labels.
    pub fn otherwise(mut self, target: impl Into<String>) -> Self {
        self.default = Some(target.into());
        self
    }

    /// Target mapped to `label`, if any.
    pub(crate) fn target_for(&self, label: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| t.as_str())
    }

    /// The designated default branch, if any.
    pub(crate) fn default_target(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Every declared target, default included. Compile validation walks
    /// this to check each one is a registered node or `END`.
    pub(crate) fn targets(&self) -> impl Iterator<Item = &str> {
        self.routes
            .iter()
            .map(|(_, t)| t.as_str())
            .chain(self.default.as_deref())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.default.is_none()
    }
}

/// A routing predicate attached to a source node, with its branch map.
#[derive(Clone)]
pub struct ConditionalEdge {
    pub(crate) predicate: RoutePredicate,
    pub(crate) branches: Branches,
}

impl ConditionalEdge {
    /// Pairs a predicate with its branches.
    pub fn new(
        predicate: impl Fn(&SessionState) -> String + Send + Sync + 'static,
        branches: Branches,
    ) -> Self {
        Self {
            predicate: Arc::new(predicate),
            branches,
        }
    }
}
