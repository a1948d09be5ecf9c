pub mod commands;
pub mod util;

pub use util::{LOCAL_USER, build_pipeline, print_error_response};
