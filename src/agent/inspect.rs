//! Read-only observation hooks.
//!
//! An [`Inspector`] receives snapshots of agent state. Every method has a
//! no-op default, so implementors override only what they watch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::path::Path;
use crate::term::Literal;

use super::plan::{Plan, PlanInstance, PlanStatistic};
use super::rule::Rule;

pub trait Inspector {
    fn inspect_cycle_time(&self, _cycle: u64, _duration: Duration) {}

    fn inspect_beliefs(&self, _beliefs: &BTreeMap<Path, Vec<Literal>>) {}

    fn inspect_plans(&self, _plans: &[(Arc<Plan>, PlanStatistic)]) {}

    fn inspect_rules(&self, _rules: &[Rule]) {}

    /// Plan instances touched by the most recent cycle.
    fn inspect_running_plans(&self, _running: &[PlanInstance]) {}

    fn inspect_pending(&self, _pending: usize) {}
}

/// Inspector that writes a `debug!` event per snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInspector;

impl Inspector for TracingInspector {
    fn inspect_cycle_time(&self, cycle: u64, duration: Duration) {
        tracing::debug!(cycle, ?duration, "cycle time");
    }

    fn inspect_beliefs(&self, beliefs: &BTreeMap<Path, Vec<Literal>>) {
        for (path, literals) in beliefs {
            tracing::debug!(path = %path, count = literals.len(), "beliefs");
        }
    }

    fn inspect_plans(&self, plans: &[(Arc<Plan>, PlanStatistic)]) {
        for (plan, stat) in plans {
            tracing::debug!(plan = %plan, successful = stat.successful, failed = stat.failed, "plan");
        }
    }

    fn inspect_rules(&self, rules: &[Rule]) {
        for rule in rules {
            tracing::debug!(rule = %rule, "rule");
        }
    }

    fn inspect_running_plans(&self, running: &[PlanInstance]) {
        for instance in running {
            tracing::debug!(plan = %instance.plan, event = %instance.event, state = ?instance.state, "plan instance");
        }
    }

    fn inspect_pending(&self, pending: usize) {
        tracing::debug!(pending, "pending triggers");
    }
}
