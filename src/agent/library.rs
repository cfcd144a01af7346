//! Trigger-indexed plan library backed by DashMap.
//!
//! Plans are grouped by [`TriggerKey`]; within a group they keep insertion
//! order, which is the order the dispatcher tries them in. Adding and removing
//! plans works through `&self`, so the library can change between cycles
//! without exclusive access to the agent.

use std::sync::Arc;

use dashmap::DashMap;

use super::plan::{Plan, PlanStatistic};
use super::trigger::{Trigger, TriggerKey};

/// Concurrent plan index plus per-plan execution counters.
#[derive(Debug, Default)]
pub struct PlanLibrary {
    index: DashMap<TriggerKey, Vec<Arc<Plan>>>,
    statistics: DashMap<u64, PlanStatistic>,
}

impl PlanLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plan. Returns `false` if an identical plan is already indexed.
    pub fn add(&self, plan: Plan) -> bool {
        let mut group = self.index.entry(plan.trigger().key()).or_default();
        if group.iter().any(|p| p.hash_code() == plan.hash_code()) {
            return false;
        }
        self.statistics.entry(plan.hash_code()).or_default();
        group.push(Arc::new(plan));
        true
    }

    /// Remove every plan whose trigger equals `trigger`. Returns how many were removed.
    pub fn remove(&self, trigger: &Trigger) -> usize {
        let key = trigger.key();
        let mut removed = Vec::new();
        if let Some(mut group) = self.index.get_mut(&key) {
            group.retain(|plan| {
                let matches = plan.trigger() == trigger;
                if matches {
                    removed.push(plan.hash_code());
                }
                !matches
            });
        }
        self.index.remove_if(&key, |_, group| group.is_empty());
        for hash in &removed {
            self.statistics.remove(hash);
        }
        removed.len()
    }

    /// Plans indexed under the trigger's key, in insertion order.
    pub fn candidates(&self, trigger: &Trigger) -> Vec<Arc<Plan>> {
        self.index
            .get(&trigger.key())
            .map(|group| group.value().clone())
            .unwrap_or_default()
    }

    /// All plans, ordered by trigger key then insertion order.
    pub fn plans(&self) -> Vec<Arc<Plan>> {
        let mut groups: Vec<(TriggerKey, Vec<Arc<Plan>>)> = self
            .index
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups.into_iter().flat_map(|(_, plans)| plans).collect()
    }

    pub fn statistic(&self, plan: &Plan) -> PlanStatistic {
        self.statistics
            .get(&plan.hash_code())
            .map(|s| *s.value())
            .unwrap_or_default()
    }

    /// Every plan with its counters.
    pub fn statistics(&self) -> Vec<(Arc<Plan>, PlanStatistic)> {
        self.plans()
            .into_iter()
            .map(|plan| {
                let stat = self.statistic(&plan);
                (plan, stat)
            })
            .collect()
    }

    pub(crate) fn record(&self, plan: &Plan, succeeded: bool) {
        let mut stat = self.statistics.entry(plan.hash_code()).or_default();
        if succeeded {
            stat.successful += 1;
        } else {
            stat.failed += 1;
        }
    }

    /// Number of plans.
    pub fn len(&self) -> usize {
        self.index.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
