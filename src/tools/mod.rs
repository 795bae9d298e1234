mod command_builder;
mod file_scanner;
mod path_naming;
mod path_validator;
mod process_runner;

pub use command_builder::{CommandBuilder, ToolCommand, concat_filter_graph};
pub use file_scanner::scan_files_with_extension;
pub use path_naming::{
    default_concat_output, default_merged_output, default_trim_output, intermediate_ts_path,
    parent_directory,
};
pub use path_validator::{
    ensure_directory_exists, validate_directory_exists, validate_file_exists,
};
pub use process_runner::{CommandResult, OutputMode, ProcessRunner};
