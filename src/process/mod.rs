//! External process execution: streaming runner and tree termination.

mod kill;
mod runner;

pub use kill::kill_tree;
pub use runner::{CommandSpec, ErrorTail, PidSlot, SPAWN_FAILURE_CODE, run_streaming};
