/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod executions;
pub mod public;
pub mod tasks;

pub use error::{Result, SearchwatchError};

pub use client::{ClientConfig, Credentials, DEFAULT_BASE_URL, SearchwatchClient};
