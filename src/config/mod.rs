pub mod load;
pub mod save;
pub mod types;

pub use types::{Config, SETTINGS_FILE, ToolSettings};
