// Application layer: the account service and its error type.
// Transport adapters (HTTP, CLI) call into this layer only.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
