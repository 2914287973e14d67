pub mod file_utils;
pub mod log_setup;
pub mod test_utils;

pub use file_utils::{ensure_dir, write_file};
pub use log_setup::{LogSetupError, setup_logging};
