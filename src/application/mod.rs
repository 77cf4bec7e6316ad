// Application layer - use cases and orchestration on top of the ledger
// and its slot storage.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
