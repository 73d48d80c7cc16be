//! Infers a regular expression consistent with a set of positive examples and inconsistent with
//! a set of negative examples, by alternating a cost-ordered bottom-up enumeration with a
//! top-down search over inverted regex operators, sharing fragments between the two.
//!
//! The entry point is [`run`].

pub mod bottom_up;
pub mod cs;
pub mod engine;
pub mod error;
pub mod guide;
pub mod ic;
pub mod ops;
pub mod partition;
pub mod top_down;

pub use bottom_up::Costs;
pub use engine::{run, Budget, RunResult};
pub use error::{CapReached, Error};
