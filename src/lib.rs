//! Minsh - Mini Shell
//!
//! A small line-oriented shell. Minsh reads one command line at a time,
//! expands the `$$` self-reference marker, splits the line into arguments
//! plus optional redirections and a background marker, and either runs a
//! builtin (`exit`, `cd`, `status`) or spawns an external process. SIGTSTP
//! toggles a foreground-only mode in which background requests are ignored.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

pub mod core;
pub mod errors;
pub mod shell;

pub use crate::shell::{Shell, ShellConfig};
