pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod logging;

pub use application::ExpenseService;
pub use domain::*;
