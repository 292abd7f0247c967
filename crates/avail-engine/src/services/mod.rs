//! Application services
//!
//! Services are thin, short-lived wrappers over the shared [`EngineContext`],
//! created per operation in the style of `Service::new(&ctx)`.

mod context;
mod listener;
mod poll;
mod query;

pub use context::{EngineContext, EngineContextBuilder};
pub use listener::{ListenOutcome, ListenerService};
pub use poll::PollService;
pub use query::QueryService;
