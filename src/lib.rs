// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-bdi
//!
//! A Belief-Desire-Intention agent runtime: agents hold beliefs, react to
//! belief and goal events by selecting plans, and bind plan variables against
//! their beliefs through logical unification.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): raw values, variables, and literals with structural hashing
//! - **Fuzzy algebra** (`fuzzy`): graded truth values, defuzzification, conjunction/disjunction
//! - **Belief store** (`belief`): hierarchical tree of views with lazy creation
//! - **Unification** (`unify`): exact and structural matching, guarded commit
//! - **Agent** (`agent`): triggers, plans, rules, actions, and the reasoning cycle
//! - **Worker pool** (`pool`): bounded rayon pool for intra-cycle parallelism
//!
//! ## Library usage
//!
//! ```
//! use akh_bdi::agent::{ActionRegistry, Agent, AgentConfig, AgentSpec, Plan, Step, Trigger};
//! use akh_bdi::term::{Literal, Term};
//!
//! let goal = Literal::new("greet", vec![Term::var("Who")], false, false).unwrap();
//! let greeted = Literal::new("greeted", vec![Term::var("Who")], false, false).unwrap();
//! let plan = Plan::new(Trigger::add_goal(goal), None, vec![Step::AddBelief(greeted)], vec![]);
//!
//! let mut agent = Agent::new(
//!     AgentConfig::default(),
//!     AgentSpec {
//!         goal: Some(Literal::new("greet", vec![Term::from("world")], false, false).unwrap()),
//!         plans: vec![plan],
//!         ..AgentSpec::default()
//!     },
//!     ActionRegistry::builder().with_builtins().build(),
//! )
//! .unwrap();
//!
//! let report = agent.cycle().unwrap();
//! assert_eq!(report.outcomes.len(), 1);
//! assert!(agent.beliefs().contains_literal(
//!     &Literal::new("greeted", vec![Term::from("world")], false, false).unwrap()
//! ));
//! ```

pub mod agent;
pub mod belief;
pub mod error;
pub mod fuzzy;
pub mod path;
pub mod pool;
pub mod term;
pub mod unify;
