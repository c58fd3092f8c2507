//! Configuration file and on-disk layout

mod paths;
mod settings;

pub use paths::{ensure_private_dir, Paths};
pub use settings::{parse_flag, Config, ServerSection};
