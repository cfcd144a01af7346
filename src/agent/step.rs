//! Plan and rule body steps.

use crate::belief::EmptyViewGenerator;
use crate::error::{ExecResult, ExecutionError, TermError};
use crate::fuzzy::FuzzyValue;
use crate::path::Path;
use crate::term::{Context, Literal, Term, Value, Variable};
use crate::unify::Guard;

use super::expression::Expression;
use super::runtime::Runtime;
use super::trigger::Trigger;

/// One element of a plan or rule body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Call a registered action; its results bind `returns` in order.
    Action {
        name: Path,
        arguments: Vec<Term>,
        returns: Vec<Variable>,
    },
    /// `+lit`: add a ground belief.
    AddBelief(Literal),
    /// `-lit`: remove a ground belief; false when it was absent.
    RemoveBelief(Literal),
    /// `!lit` queues an `AddGoal` trigger; `!!lit` dispatches it synchronously.
    Achieve { literal: Literal, immediately: bool },
    /// `>>lit`: unify against the belief store, optionally guarded.
    Unify {
        literal: Literal,
        guard: Option<Expression>,
        parallel: bool,
    },
    /// Boolean expression; its value is the step result.
    Test(Expression),
    Assign { variable: Path, expression: Expression },
    Increment(Path),
    Decrement(Path),
    /// Call a rule; results flow back through relocate variables.
    Rule(Literal),
}

impl Step {
    /// Variables this step reads or binds.
    pub fn variables(&self) -> Vec<Variable> {
        let mut found: Vec<Variable> = Vec::new();
        match self {
            Step::Action {
                arguments, returns, ..
            } => {
                for argument in arguments {
                    argument.collect_variables(&mut found);
                }
                for variable in returns {
                    if !found.contains(variable) {
                        found.push(variable.clone());
                    }
                }
            }
            Step::AddBelief(literal)
            | Step::RemoveBelief(literal)
            | Step::Achieve { literal, .. }
            | Step::Rule(literal) => found = literal.variables(),
            Step::Unify { literal, guard, .. } => {
                found = literal.variables();
                if let Some(guard) = guard {
                    push_names(&mut found, guard.variables());
                }
            }
            Step::Test(expression) => push_names(&mut found, expression.variables()),
            Step::Assign {
                variable,
                expression,
            } => {
                push_names(&mut found, vec![variable.clone()]);
                push_names(&mut found, expression.variables());
            }
            Step::Increment(variable) | Step::Decrement(variable) => {
                push_names(&mut found, vec![variable.clone()]);
            }
        }
        found
    }

    /// Execute the step, updating `context` with any bindings it produces.
    pub fn execute(&self, runtime: &Runtime<'_>, context: &mut Context) -> ExecResult<FuzzyValue<bool>> {
        self.run(runtime, context, false)
    }

    /// `parallel` tells actions whether the step is part of a parallel body.
    pub(crate) fn run(
        &self,
        runtime: &Runtime<'_>,
        context: &mut Context,
        parallel: bool,
    ) -> ExecResult<FuzzyValue<bool>> {
        match self {
            Step::Action {
                name,
                arguments,
                returns,
            } => {
                let resolved = arguments
                    .iter()
                    .map(|argument| resolve_argument(argument, context))
                    .collect::<ExecResult<Vec<_>>>()?;
                let mut results = Vec::new();
                let name = name.to_string();
                let outcome = runtime.actions().execute(
                    &name,
                    parallel,
                    context,
                    &resolved,
                    &mut results,
                )?;
                if results.len() < returns.len() {
                    return Err(ExecutionError::Action {
                        message: format!("returned {} values, {} expected", results.len(), returns.len()),
                        name,
                    });
                }
                for (variable, value) in returns.iter().zip(results) {
                    context.bind(variable.name(), value)?;
                }
                Ok(outcome)
            }

            Step::AddBelief(literal) => {
                let ground = literal.ground(context)?;
                if runtime.beliefs().add(&ground, Some(&EmptyViewGenerator))? {
                    runtime.emit(Trigger::add_belief(ground));
                }
                Ok(FuzzyValue::truth())
            }

            Step::RemoveBelief(literal) => {
                let ground = literal.ground(context)?;
                let removed = runtime.beliefs().remove(&ground);
                if removed {
                    runtime.emit(Trigger::delete_belief(ground));
                }
                Ok(FuzzyValue::from(removed))
            }

            Step::Achieve {
                literal,
                immediately,
            } => {
                let goal = Trigger::add_goal(literal.substitute(context));
                if !immediately {
                    runtime.emit(goal);
                    return Ok(FuzzyValue::truth());
                }
                match runtime.dispatch(&goal)? {
                    Some(outcome) => Ok(outcome.reported),
                    None => {
                        tracing::warn!(goal = %goal, "no applicable plan for immediate goal");
                        Ok(FuzzyValue::falsity())
                    }
                }
            }

            Step::Unify {
                literal,
                guard,
                parallel: parallel_unify,
            } => {
                let check = guard
                    .as_ref()
                    .map(|g| move |c: &Context| g.evaluate_fuzzy(c));
                let unified = runtime.unifier().unify(
                    runtime.beliefs(),
                    literal,
                    context,
                    check.as_ref().map(|c| c as &Guard<'_>),
                    *parallel_unify || runtime.parallel_unification(),
                )?;
                match unified {
                    Some(committed) => {
                        *context = committed;
                        Ok(FuzzyValue::truth())
                    }
                    None => Ok(FuzzyValue::falsity()),
                }
            }

            Step::Test(expression) => expression.evaluate_fuzzy(context),

            Step::Assign {
                variable,
                expression,
            } => {
                let value = expression.evaluate(context)?;
                context.bind(variable, Term::Raw(value))?;
                Ok(FuzzyValue::truth())
            }

            Step::Increment(variable) => step_number(context, variable, 1),
            Step::Decrement(variable) => step_number(context, variable, -1),

            Step::Rule(literal) => runtime.call_rule(literal, context),
        }
    }
}

fn push_names(found: &mut Vec<Variable>, names: Vec<Path>) {
    for name in names {
        let variable = Variable::new(name);
        if !found.contains(&variable) {
            found.push(variable);
        }
    }
}

/// Variables must be bound; nested literals are unified against the context.
fn resolve_argument(argument: &Term, context: &Context) -> ExecResult<Term> {
    Ok(match argument {
        Term::Variable(v) => context.value(v.name())?,
        Term::Literal(l) => Term::Literal(l.unify(context)),
        raw => raw.clone(),
    })
}

fn step_number(context: &mut Context, variable: &Path, delta: i64) -> ExecResult<FuzzyValue<bool>> {
    let next = match context.value(variable)?.raw()?.snapshot() {
        Value::Int(i) => Value::Int(i.wrapping_add(delta)),
        Value::Float(x) => Value::Float(x + delta as f64),
        other => {
            return Err(TermError::TypeMismatch {
                expected: "number".into(),
                found: other.type_name().into(),
            }
            .into());
        }
    };
    context.bind(variable, Term::Raw(next))?;
    Ok(FuzzyValue::truth())
}
