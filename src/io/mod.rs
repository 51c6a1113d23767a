// One-way export of session data. Nothing is ever read back in.
mod export;

pub use export::*;
