/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public searchwatch adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod poller;
pub mod status;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    Credentials,
    DEFAULT_BASE_URL,
    Result,
    SearchwatchClient,
    SearchwatchError,
};

pub use poller::{ExecutionPoller, ExecutionSource, PollConfig};
pub use status::{DisplayStatus, classify};

// Re-export all types
pub use types::*;
