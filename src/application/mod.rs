// Application layer: the API presentation code talks to.
// ExpenseService wraps one ledger and accepts raw user input,
// SessionRegistry keeps one service per interactive session.

pub mod error;
pub mod reporting;
pub mod service;
pub mod sessions;

pub use error::*;
pub use reporting::*;
pub use service::*;
pub use sessions::*;
