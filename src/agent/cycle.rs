//! Reasoning cycle: drain pending triggers, dispatch each to its plans,
//! and queue whatever the executed plans emitted for the next cycle.

use std::time::{Duration, Instant};

use super::agent::Agent;
use super::error::{AgentError, AgentResult};
use super::plan::{PlanOutcome, PlanState};
use super::runtime::Runtime;
use super::trigger::{Trigger, TriggerType};

/// Result of a single reasoning cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Which cycle this was.
    pub cycle: u64,
    pub duration: Duration,
    /// Triggers taken from the queue, in processing order.
    pub processed: Vec<Trigger>,
    /// One outcome per trigger that found an applicable plan.
    pub outcomes: Vec<PlanOutcome>,
    /// Goal additions no plan could handle.
    pub unhandled_goals: Vec<Trigger>,
    /// Queue length after the cycle.
    pub pending: usize,
}

impl CycleReport {
    /// Whether every processed goal was handled and every plan succeeded.
    pub fn is_clean(&self) -> bool {
        self.unhandled_goals.is_empty()
            && self.outcomes.iter().all(|o| o.state == PlanState::Succeeded)
    }
}

/// Run one cycle on the agent.
pub fn run_cycle(agent: &mut Agent) -> AgentResult<CycleReport> {
    agent.cycle_count += 1;
    let cycle = agent.cycle_count;
    let started = Instant::now();

    let take = agent.config.max_triggers_per_cycle.min(agent.pending.len());
    let processed: Vec<Trigger> = agent.pending.drain(..take).collect();

    let runtime = Runtime::new(
        &agent.beliefs,
        &agent.actions,
        &agent.plans,
        &agent.rules,
        &agent.pool,
        agent.config.defuzzify,
        agent.config.parallel_unification,
    );

    let mut outcomes = Vec::new();
    let mut unhandled_goals = Vec::new();
    let mut failure = None;

    for (index, trigger) in processed.iter().enumerate() {
        match runtime.dispatch(trigger) {
            Ok(Some(outcome)) => outcomes.push(outcome),
            // a missing failure handler is not an unhandled goal
            Ok(None) if trigger.kind() == TriggerType::AddGoal => {
                tracing::warn!(cycle, trigger = %trigger, "no applicable plan for goal");
                unhandled_goals.push(trigger.clone());
            }
            Ok(None) => {
                tracing::debug!(cycle, trigger = %trigger, "trigger ignored");
            }
            Err(e) => {
                failure = Some((index, e));
                break;
            }
        }
    }

    let (emitted, instances) = runtime.finish();
    if let Some((index, _)) = &failure {
        // undispatched triggers go back to the front, in order
        for trigger in processed[index + 1..].iter().rev() {
            agent.pending.push_front(trigger.clone());
        }
    }
    agent.pending.extend(emitted);
    agent.running = instances;

    let duration = started.elapsed();
    agent.last_cycle_time = duration;

    if let Some((_, e)) = failure {
        tracing::warn!(cycle, error = %e, pending = agent.pending.len(), "cycle aborted");
        return Err(e.into());
    }
    if agent.config.strict_goals {
        if let Some(goal) = unhandled_goals.first() {
            return Err(AgentError::UnhandledGoal {
                trigger: goal.to_string(),
            });
        }
    }

    tracing::debug!(
        cycle,
        processed = processed.len(),
        outcomes = outcomes.len(),
        pending = agent.pending.len(),
        ?duration,
        "cycle complete"
    );

    Ok(CycleReport {
        cycle,
        duration,
        processed,
        outcomes,
        unhandled_goals,
        pending: agent.pending.len(),
    })
}
