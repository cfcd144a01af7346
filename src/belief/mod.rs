//! Hierarchical belief store.
//!
//! Beliefs live in a tree of named [`View`]s addressed by [`Path`](crate::path::Path).
//! A literal `sensor/room/temperature(21)` is stored in the view `sensor/room`
//! under the functor `temperature`. Missing intermediate views are created on
//! demand when the caller passes a [`ViewGenerator`]:
//!
//! - [`EmptyViewGenerator`] creates plain empty views
//! - [`JsonViewGenerator`] seeds new views from a JSON document
//!
//! Each node guards its own children and literal buckets with an `RwLock`, so
//! belief updates never corrupt a concurrent read traversal.

pub mod generator;
pub mod view;

pub use generator::{EmptyViewGenerator, JsonViewGenerator, ViewGenerator};
pub use view::View;
