pub mod config;
pub mod coordinate;
pub mod logging;
pub mod perspectives;
pub mod utils;

pub use config::{handle_config_command, ConfigCommands};
pub use coordinate::run_coordination;
pub use perspectives::list_perspectives;
