//! Async client for the Rundeck REST API.
//!
//! ```no_run
//! # async fn run() -> rundeck::Result<()> {
//! let client = rundeck::Client::new(rundeck::Config::load()?)?;
//! for project in client.projects().list().await? {
//!     println!("{}", project.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use client::Client;
pub use config::Config;
pub use error::{ApiError, Result, RundeckError};
