//! Agent layer: the BDI execution machinery on top of terms, beliefs, and unification.
//!
//! - **Triggers** (belief and goal events) index the plan library
//! - **Plans** bind their trigger against an event, check a guard, and run a body of steps
//! - **Rules** are callable step sequences whose results flow back to the caller
//! - **Actions** are leaf operations in an immutable registry built at construction
//! - **Reasoning cycle** drains pending triggers and dispatches them, one step per call

pub mod action;
pub mod agent;
pub mod config;
pub mod cycle;
pub mod error;
pub mod expression;
pub mod inspect;
pub mod library;
pub mod plan;
pub mod rule;
pub mod runtime;
pub mod step;
pub mod trigger;

pub use action::{Action, ActionRegistry, ActionRegistryBuilder, FnAction, PrintAction, ThrowAction};
pub use agent::{Agent, AgentSpec};
pub use config::AgentConfig;
pub use cycle::CycleReport;
pub use error::{AgentError, AgentResult};
pub use expression::{BinaryOp, Expression, UnaryOp};
pub use inspect::{Inspector, TracingInspector};
pub use library::PlanLibrary;
pub use plan::{Annotation, Plan, PlanInstance, PlanOutcome, PlanState, PlanStatistic};
pub use rule::Rule;
pub use runtime::Runtime;
pub use step::Step;
pub use trigger::{Trigger, TriggerKey, TriggerType};
