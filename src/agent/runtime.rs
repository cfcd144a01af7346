//! Per-cycle execution environment.
//!
//! A [`Runtime`] borrows the agent's belief store, actions, plans, rules, and
//! worker pool for the duration of one cycle. Plans and steps execute against
//! it; triggers they emit are buffered here and handed back to the agent's
//! queue when the cycle ends.

use std::sync::{Arc, Mutex};

use crate::belief::View;
use crate::error::{ExecResult, ExecutionError};
use crate::fuzzy::{Conjunction, Defuzzify, FuzzyValue};
use crate::pool::WorkerPool;
use crate::term::{Context, Literal};
use crate::unify::Unifier;

use super::action::ActionRegistry;
use super::library::PlanLibrary;
use super::plan::{PlanInstance, PlanOutcome, PlanState};
use super::rule::Rule;
use super::step::Step;
use super::trigger::Trigger;

pub struct Runtime<'a> {
    beliefs: &'a View,
    actions: &'a ActionRegistry,
    plans: &'a PlanLibrary,
    rules: &'a [Rule],
    pool: &'a WorkerPool,
    defuzzify: Defuzzify,
    parallel_unification: bool,
    emitted: Mutex<Vec<Trigger>>,
    instances: Mutex<Vec<PlanInstance>>,
}

impl<'a> Runtime<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        beliefs: &'a View,
        actions: &'a ActionRegistry,
        plans: &'a PlanLibrary,
        rules: &'a [Rule],
        pool: &'a WorkerPool,
        defuzzify: Defuzzify,
        parallel_unification: bool,
    ) -> Self {
        Self {
            beliefs,
            actions,
            plans,
            rules,
            pool,
            defuzzify,
            parallel_unification,
            emitted: Mutex::new(Vec::new()),
            instances: Mutex::new(Vec::new()),
        }
    }

    pub fn beliefs(&self) -> &View {
        self.beliefs
    }

    pub fn actions(&self) -> &ActionRegistry {
        self.actions
    }

    pub fn plans(&self) -> &PlanLibrary {
        self.plans
    }

    pub fn defuzzify(&self) -> Defuzzify {
        self.defuzzify
    }

    pub fn parallel_unification(&self) -> bool {
        self.parallel_unification
    }

    pub fn unifier(&self) -> Unifier<'_> {
        Unifier::new(self.defuzzify).with_pool(self.pool)
    }

    /// Queue a trigger for the next cycle.
    pub fn emit(&self, trigger: Trigger) {
        tracing::trace!(trigger = %trigger, "trigger emitted");
        self.emitted.lock().expect("runtime lock poisoned").push(trigger);
    }

    /// Select and run the first applicable plan for `trigger`.
    ///
    /// Candidates come from the trigger index in insertion order; the first one
    /// that unifies with the event and passes its guard is executed and no
    /// other plan is tried. `None` means no plan was applicable.
    pub fn dispatch(&self, trigger: &Trigger) -> ExecResult<Option<PlanOutcome>> {
        let candidates = self.plans.candidates(trigger);
        tracing::debug!(trigger = %trigger, candidates = candidates.len(), "dispatching trigger");

        for plan in candidates {
            let Some(context) = plan.instantiate(trigger.literal(), self)? else {
                continue;
            };
            // rejected candidates stay visible as `Instantiated`
            let slot = self.track(PlanInstance {
                plan: Arc::clone(&plan),
                event: trigger.clone(),
                state: PlanState::Instantiated,
            });
            if !plan.check_guard(&context, self)? {
                continue;
            }
            self.set_state(slot, PlanState::GuardChecked);
            tracing::debug!(plan = %plan, "plan selected");
            self.set_state(slot, PlanState::Executing);
            let outcome = plan.execute(trigger, context, self)?;
            self.set_state(slot, outcome.state);
            return Ok(Some(outcome));
        }
        Ok(None)
    }

    /// Run steps in order, stopping at the first one that defuzzifies false.
    /// Returns the aggregate and the number of steps executed.
    pub fn run_sequence(&self, steps: &[Step], context: &mut Context) -> ExecResult<(FuzzyValue<bool>, usize)> {
        let mut error = None;
        let results = steps.iter().map_while(|step| match step.execute(self, context) {
            Ok(result) => Some(result),
            Err(e) => {
                error = Some(e);
                None
            }
        });
        let (aggregate, executed) = Conjunction::new(self.defuzzify).sequential(results);
        match error {
            Some(e) => Err(e),
            None => Ok((aggregate, executed)),
        }
    }

    /// Run every step on its own duplicate of `context` on the worker pool.
    pub fn run_parallel(&self, steps: &[Step], context: &Context) -> ExecResult<(FuzzyValue<bool>, usize)> {
        let results = self
            .pool
            .map_all(steps, |step| {
                let mut local = context.clone();
                step.run(self, &mut local, true)
            })
            .into_iter()
            .collect::<ExecResult<Vec<_>>>()?;
        Ok((Conjunction::new(self.defuzzify).combine(&results), results.len()))
    }

    /// Call the first rule that accepts `literal` and whose body succeeds.
    pub fn call_rule(&self, literal: &Literal, context: &mut Context) -> ExecResult<FuzzyValue<bool>> {
        let call = literal.substitute(context);
        let mut known = false;

        for rule in self.rules.iter().filter(|r| r.accepts(&call)) {
            known = true;
            let Some(bindings) = self.unifier().bind(rule.head(), &call) else {
                continue;
            };
            if bindings.len() != rule.head().variables().len() {
                continue;
            }
            let mut local = rule.context();
            for binding in bindings.iter() {
                rule.bind_head(&binding.name, &binding.value, &mut local)?;
            }
            let (result, _) = self.run_sequence(rule.body(), &mut local)?;
            if self.defuzzify.defuzzify(&result) {
                local.propagate(context)?;
                return Ok(result);
            }
        }

        if known {
            Ok(FuzzyValue::falsity())
        } else {
            Err(ExecutionError::RuleNotFound {
                name: format!("{}/{}", call.fqn_functor(), call.arity()),
            })
        }
    }

    /// Triggers emitted during this cycle and the plan instances it ran.
    pub fn finish(self) -> (Vec<Trigger>, Vec<PlanInstance>) {
        let emitted = self.emitted.into_inner().expect("runtime lock poisoned");
        let instances = self.instances.into_inner().expect("runtime lock poisoned");
        (emitted, instances)
    }

    fn track(&self, instance: PlanInstance) -> usize {
        let mut instances = self.instances.lock().expect("runtime lock poisoned");
        instances.push(instance);
        instances.len() - 1
    }

    fn set_state(&self, slot: usize, state: PlanState) {
        if let Some(instance) = self.instances.lock().expect("runtime lock poisoned").get_mut(slot) {
            instance.state = state;
        }
    }
}

impl std::fmt::Debug for Runtime<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("defuzzify", &self.defuzzify)
            .field("parallel_unification", &self.parallel_unification)
            .field("pool", &self.pool)
            .finish()
    }
}
