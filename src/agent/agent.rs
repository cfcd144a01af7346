//! Agent struct: the main API of the BDI layer.
//!
//! An `Agent` owns its belief tree, plan library, rules, action registry,
//! worker pool, and trigger queue. An external scheduler calls [`Agent::cycle`]
//! once per step; everything between two calls is synchronous.

use std::collections::VecDeque;
use std::time::Duration;

use crate::belief::{EmptyViewGenerator, View};
use crate::pool::WorkerPool;
use crate::term::Literal;

use super::action::ActionRegistry;
use super::config::AgentConfig;
use super::cycle::{self, CycleReport};
use super::error::{AgentError, AgentResult};
use super::inspect::Inspector;
use super::library::PlanLibrary;
use super::plan::{Plan, PlanInstance};
use super::rule::Rule;
use super::trigger::Trigger;

/// Declarative agent definition: what a source parser produces.
#[derive(Debug, Clone, Default)]
pub struct AgentSpec {
    /// Beliefs present before the first cycle. They do not raise triggers.
    pub beliefs: Vec<Literal>,
    /// Goal queued for the first cycle.
    pub goal: Option<Literal>,
    pub plans: Vec<Plan>,
    /// Rules, tried in this order.
    pub rules: Vec<Rule>,
}

/// A BDI agent.
pub struct Agent {
    pub(crate) config: AgentConfig,
    pub(crate) beliefs: View,
    pub(crate) plans: PlanLibrary,
    pub(crate) rules: Vec<Rule>,
    pub(crate) actions: ActionRegistry,
    pub(crate) pool: WorkerPool,
    pub(crate) pending: VecDeque<Trigger>,
    pub(crate) cycle_count: u64,
    /// Plan instances touched by the most recent cycle.
    pub(crate) running: Vec<PlanInstance>,
    pub(crate) last_cycle_time: Duration,
}

impl Agent {
    /// Build an agent from its configuration, definition, and actions.
    pub fn new(config: AgentConfig, spec: AgentSpec, actions: ActionRegistry) -> AgentResult<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads).map_err(|e| AgentError::Pool {
            message: e.to_string(),
        })?;

        let beliefs = View::root();
        for literal in &spec.beliefs {
            beliefs.add(literal, Some(&EmptyViewGenerator))?;
        }

        let plans = PlanLibrary::new();
        for plan in spec.plans {
            if !plans.add(plan) {
                tracing::debug!("duplicate plan skipped");
            }
        }

        let mut pending = VecDeque::new();
        if let Some(goal) = spec.goal {
            pending.push_back(Trigger::add_goal(goal));
        }

        tracing::info!(
            agent = %config.name,
            beliefs = beliefs.len(),
            plans = plans.len(),
            rules = spec.rules.len(),
            actions = actions.len(),
            workers = pool.threads(),
            "agent created"
        );

        Ok(Self {
            config,
            beliefs,
            plans,
            rules: spec.rules,
            actions,
            pool,
            pending,
            cycle_count: 0,
            running: Vec::new(),
            last_cycle_time: Duration::ZERO,
        })
    }

    /// Merge perceived belief changes and queue a trigger for each real change.
    pub fn perceive(&mut self, added: &[Literal], removed: &[Literal]) -> AgentResult<()> {
        for literal in removed {
            self.remove_belief(literal);
        }
        for literal in added {
            self.add_belief(literal)?;
        }
        Ok(())
    }

    /// Add a belief; queues `AddBelief` when it was not already held.
    pub fn add_belief(&mut self, literal: &Literal) -> AgentResult<bool> {
        let added = self.beliefs.add(literal, Some(&EmptyViewGenerator))?;
        if added {
            self.pending.push_back(Trigger::add_belief(literal.clone()));
        }
        Ok(added)
    }

    /// Remove a belief; queues `DeleteBelief` when it was held.
    pub fn remove_belief(&mut self, literal: &Literal) -> bool {
        let removed = self.beliefs.remove(literal);
        if removed {
            self.pending.push_back(Trigger::delete_belief(literal.clone()));
        }
        removed
    }

    /// Queue an arbitrary trigger, typically a goal request.
    pub fn trigger(&mut self, trigger: Trigger) {
        self.pending.push_back(trigger);
    }

    /// Run one reasoning cycle.
    pub fn cycle(&mut self) -> AgentResult<CycleReport> {
        cycle::run_cycle(self)
    }

    pub fn beliefs(&self) -> &View {
        &self.beliefs
    }

    pub fn plans(&self) -> &PlanLibrary {
        &self.plans
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn running_plans(&self) -> &[PlanInstance] {
        &self.running
    }

    /// Triggers waiting for the next cycle.
    pub fn pending(&self) -> impl Iterator<Item = &Trigger> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Hand read-only snapshots of the agent to an inspector.
    pub fn inspect(&self, inspector: &dyn Inspector) {
        inspector.inspect_cycle_time(self.cycle_count, self.last_cycle_time);
        inspector.inspect_beliefs(&self.beliefs.literals());
        inspector.inspect_plans(&self.plans.statistics());
        inspector.inspect_rules(&self.rules);
        inspector.inspect_running_plans(&self.running);
        inspector.inspect_pending(self.pending.len());
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.config.name)
            .field("beliefs", &self.beliefs.len())
            .field("plans", &self.plans.len())
            .field("rules", &self.rules.len())
            .field("pending", &self.pending.len())
            .field("cycle_count", &self.cycle_count)
            .finish()
    }
}
