mod load;
mod planfile;
mod types;

pub use load::{get_fanout_data_dir, load_default, load_from};
pub use planfile::{CommandConfig, Network, Planfile};
pub use types::{AppConfig, LogOutput, LoggingConfig};
