//! Command implementations.

pub mod inspect;
pub mod run;

pub use self::inspect::{execute_domains, execute_errors, execute_history, execute_nodes};
pub use self::run::{execute_cycle, execute_run};
