//! Execution planner - pairs each request with the reconciler for its kind

use crate::reconciler::Reconcile;
use crate::types::DesiredState;

/// One request bound to the reconciler that will handle it
pub struct PlanEntry<'r> {
    pub desired: DesiredState,
    pub reconciler: &'r dyn Reconcile,
}

/// An ordered batch of independent requests
#[derive(Default)]
pub struct ExecutionPlan<'r> {
    pub entries: Vec<PlanEntry<'r>>,
}

impl<'r> ExecutionPlan<'r> {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, desired: DesiredState, reconciler: &'r dyn Reconcile) {
        self.entries.push(PlanEntry {
            desired,
            reconciler,
        });
    }

    /// Filter plan to only include requests matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&DesiredState) -> bool,
    {
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|e| predicate(&e.desired))
                .collect(),
        }
    }

    /// Filter plan to only include requests matching a target pattern
    ///
    /// Target format: "kind" or "kind.name". Names compare exactly,
    /// ignoring case.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (kind, name) = parse_target(t);
                self.filter(|d| matches_filter(d, kind, name))
            }
        }
    }

    /// Total number of requests in the plan
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a target string like "kind.name" into (kind, name).
///
/// Only the first dot separates; file paths keep theirs.
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((kind, name)) => (kind, Some(name)),
        None => (target, None),
    }
}

fn matches_filter(desired: &DesiredState, kind: &str, name: Option<&str>) -> bool {
    if desired.kind.as_str() != kind {
        return false;
    }
    match name {
        Some(n) => desired.identity.eq_ignore_ascii_case(n),
        None => true,
    }
}
