//! Plans: trigger-indexed templates instantiated into a context and executed.
//!
//! A plan moves through [`PlanState`]s:
//!
//! ```text
//! Instantiated ──guard──▶ GuardChecked ──▶ Executing ──▶ Succeeded
//!                                                   └──▶ Failed
//! ```
//!
//! A rejected guard is not a failure: the instance stays `Instantiated`, the
//! plan is inapplicable, and the dispatcher moves on to the next candidate. A failed body emits a
//! `DeleteGoal` trigger carrying the unified event literal.

use std::sync::Arc;

use crate::error::ExecResult;
use crate::fuzzy::FuzzyValue;
use crate::path::Path;
use crate::term::{Context, Literal, Value, Variable, hash_of};

use super::expression::Expression;
use super::runtime::Runtime;
use super::step::Step;
use super::trigger::{Trigger, TriggerType};

/// Plan annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Report success to the caller even when the body fails.
    Atomic,
    /// Run all body steps concurrently on duplicated contexts.
    Parallel,
    /// Bind a constant variable in every instantiated context.
    Constant { name: Path, value: Value },
}

/// Lifecycle state of a plan instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanState {
    Instantiated,
    GuardChecked,
    Executing,
    Succeeded,
    Failed,
}

/// Execution counters for one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanStatistic {
    pub successful: u64,
    pub failed: u64,
}

impl PlanStatistic {
    pub fn total(&self) -> u64 {
        self.successful + self.failed
    }
}

/// A plan template.
#[derive(Debug, Clone)]
pub struct Plan {
    trigger: Trigger,
    guard: Option<Expression>,
    body: Vec<Step>,
    annotations: Vec<Annotation>,
    hash: u64,
}

impl Plan {
    pub fn new(
        trigger: Trigger,
        guard: Option<Expression>,
        body: Vec<Step>,
        annotations: Vec<Annotation>,
    ) -> Self {
        let hash = hash_of(&(&trigger, &guard, &body, &annotations));
        Self {
            trigger,
            guard,
            body,
            annotations,
            hash,
        }
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn guard(&self) -> Option<&Expression> {
        self.guard.as_ref()
    }

    pub fn body(&self) -> &[Step] {
        &self.body
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    pub fn is_atomic(&self) -> bool {
        self.annotations.contains(&Annotation::Atomic)
    }

    pub fn is_parallel(&self) -> bool {
        self.annotations.contains(&Annotation::Parallel)
    }

    /// Fresh context holding every variable of the trigger, guard, and body,
    /// plus the constants declared by annotations.
    pub fn context(&self) -> Context {
        let mut variables = self.trigger.literal().variables();
        if let Some(guard) = &self.guard {
            variables.extend(guard.variables().into_iter().map(Variable::new));
        }
        for step in &self.body {
            variables.extend(step.variables());
        }
        let mut context = Context::from_variables(&variables);
        for annotation in &self.annotations {
            if let Annotation::Constant { name, value } = annotation {
                context.insert(Variable::constant(name.clone(), value.clone()));
            }
        }
        context
    }

    /// Bind the plan's trigger literal to `event`.
    ///
    /// Returns the instantiated context, or `None` when the event does not
    /// unify or leaves a trigger variable unbound.
    pub fn instantiate(&self, event: &Literal, runtime: &Runtime<'_>) -> ExecResult<Option<Context>> {
        let template = self.trigger.literal();
        let Some(bindings) = runtime.unifier().bind(template, event) else {
            return Ok(None);
        };
        if bindings.len() != template.variables().len() {
            return Ok(None);
        }
        let mut context = self.context();
        bindings.apply(&mut context)?;
        Ok(Some(context))
    }

    /// Whether the guard accepts an instantiated context. No guard accepts everything.
    pub fn check_guard(&self, context: &Context, runtime: &Runtime<'_>) -> ExecResult<bool> {
        let Some(guard) = &self.guard else {
            return Ok(true);
        };
        let verdict = guard.evaluate_fuzzy(context)?;
        let accepted = runtime.defuzzify().defuzzify(&verdict);
        if !accepted {
            tracing::trace!(plan = %self, "guard rejected");
        }
        Ok(accepted)
    }

    /// Run the body in `context` and produce the outcome.
    pub fn execute(self: &Arc<Self>, event: &Trigger, mut context: Context, runtime: &Runtime<'_>) -> ExecResult<PlanOutcome> {
        let (result, executed) = if self.is_parallel() {
            runtime.run_parallel(&self.body, &context)?
        } else {
            runtime.run_sequence(&self.body, &mut context)?
        };

        let succeeded = runtime.defuzzify().defuzzify(&result);
        let state = if succeeded {
            PlanState::Succeeded
        } else {
            PlanState::Failed
        };
        runtime.plans().record(self, succeeded);

        if !succeeded {
            tracing::warn!(plan = %self, event = %event, executed, "plan failed");
            // a failing failure handler does not re-trigger itself
            if event.kind() != TriggerType::DeleteGoal {
                runtime.emit(Trigger::delete_goal(self.trigger.literal().unify(&context)));
            }
        }

        let reported = if self.is_atomic() {
            FuzzyValue::truth()
        } else {
            result
        };
        Ok(PlanOutcome {
            plan: Arc::clone(self),
            event: event.clone(),
            state,
            result,
            reported,
            executed,
        })
    }
}

impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Plan {}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.trigger)?;
        if !self.annotations.is_empty() {
            let names: Vec<&str> = self
                .annotations
                .iter()
                .map(|a| match a {
                    Annotation::Atomic => "atomic",
                    Annotation::Parallel => "parallel",
                    Annotation::Constant { .. } => "constant",
                })
                .collect();
            write!(f, " @[{}]", names.join(", "))?;
        }
        write!(f, " ({} steps)", self.body.len())
    }
}

/// A plan touched by a cycle, with the state it reached.
#[derive(Debug, Clone)]
pub struct PlanInstance {
    pub plan: Arc<Plan>,
    pub event: Trigger,
    pub state: PlanState,
}

/// Result of executing one plan instance.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: Arc<Plan>,
    pub event: Trigger,
    /// `Succeeded` or `Failed`.
    pub state: PlanState,
    /// Aggregate of the executed body steps.
    pub result: FuzzyValue<bool>,
    /// What the caller sees: `result`, or true for atomic plans.
    pub reported: FuzzyValue<bool>,
    /// Number of body steps that ran.
    pub executed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::expression::BinaryOp;
    use crate::term::Term;

    fn goal(arguments: Vec<Term>) -> Trigger {
        Trigger::add_goal(Literal::new("heat", arguments, false, false).unwrap())
    }

    #[test]
    fn context_collects_all_variables_and_constants() {
        let plan = Plan::new(
            goal(vec![Term::var("Room")]),
            Some(Expression::binary(BinaryOp::Less, Expression::var("T"), Expression::var("Limit"))),
            vec![Step::Increment(Path::from("T"))],
            vec![Annotation::Constant {
                name: Path::from("Limit"),
                value: Value::Int(21),
            }],
        );
        let context = plan.context();
        assert!(context.contains(&Path::from("Room")));
        assert!(context.contains(&Path::from("T")));
        assert_eq!(context.bound_names(), vec![&Path::from("Limit")]);
        assert_eq!(context.value(&Path::from("Limit")).unwrap().raw().unwrap(), Value::Int(21));
    }

    #[test]
    fn identical_plans_share_a_hash() {
        let make = || Plan::new(goal(vec![Term::var("R")]), None, vec![], vec![Annotation::Atomic]);
        assert_eq!(make(), make());
        assert_ne!(
            make().hash_code(),
            Plan::new(goal(vec![Term::var("R")]), None, vec![], vec![]).hash_code()
        );
        assert!(make().is_atomic());
        assert!(!make().is_parallel());
    }

    #[test]
    fn display_lists_annotations() {
        let plan = Plan::new(goal(vec![]), None, vec![], vec![Annotation::Atomic, Annotation::Parallel]);
        let text = plan.to_string();
        assert!(text.contains("@[atomic, parallel]"));
        assert!(text.ends_with("(0 steps)"));
    }

    #[test]
    fn statistic_total() {
        let stat = PlanStatistic {
            successful: 3,
            failed: 2,
        };
        assert_eq!(stat.total(), 5);
    }
}
