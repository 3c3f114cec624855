//! Sales dashboard core: a local snapshot of a remote customer collection,
//! kept eventually consistent by a push-based change feed, with pure
//! aggregation against fixed per-salesperson targets.

pub mod config;
pub mod error;
pub mod feed;
pub mod mask;
pub mod notify;
pub mod render;
pub mod services;
pub mod state;
pub mod stats;
pub mod store;
pub mod types;
pub mod util;
