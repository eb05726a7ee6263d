//! Type-safe wrappers for domain primitives.
//!
//! These newtypes prevent mixing up raw integers and decimals that happen to
//! represent different things (flower IDs vs. category IDs, prices vs. counts).

pub mod id;
pub mod price;

pub use id::{CategoryId, FlowerId};
pub use price::Price;
