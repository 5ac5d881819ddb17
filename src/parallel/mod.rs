//! Worker-pool execution and cancellation.

mod cancel;
mod executor;

pub use cancel::CancelToken;
pub use executor::Executor;
