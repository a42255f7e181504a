//! Async helpers shared by the tool providers and the conversation engine.
//!
//! Every upstream call (tool listing, tool invocation, model completion) runs
//! under an explicit deadline:
//!
//! ```rust,ignore
//! use tooling::async_utils::timeout::{with_timeout, TimeoutError};
//! use std::time::Duration;
//!
//! match with_timeout(Duration::from_secs(10), provider.list_tools()).await {
//!     Ok(tools) => println!("{} tools", tools.len()),
//!     Err(TimeoutError::Timeout(d)) => eprintln!("gave up after {d:?}"),
//!     Err(TimeoutError::OperationFailed(e)) => eprintln!("{e}"),
//! }
//! ```

pub mod timeout;

pub use timeout::{with_timeout, TimeoutError};
