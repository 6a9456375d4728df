//! CLI command handlers, one file per subcommand.

mod config;
mod get;

pub use config::show_config;
pub use get::{run_get, GetRequest};
