pub mod args;
pub mod cache;
pub mod config;
pub mod make;
pub mod search;

pub use args::{
    CacheCliArgs, CacheCommand, Cli, CliCommand, ConfigCliArgs, ConfigCommand, MakeCliArgs,
    SearchCliArgs,
};
pub use cache::handle_cache_command;
pub use config::handle_config_command;
pub use make::handle_make_command;
pub use search::handle_search_command;
