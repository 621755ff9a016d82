//! CLI domain: parse, route, output, and presentation only.
//! Tree semantics live in `crate::tree`; the route table only loads, mutates
//! and writes snapshot files.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::{read_tree, write_tree, RunContext};
