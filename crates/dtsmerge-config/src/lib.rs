pub mod loader;
pub mod types;
pub mod validate;

pub use loader::ConfigError;
pub use types::{BundlerConfig, EntryPointConfig, LibrariesOptions, OutputOptions};
pub use validate::{
    validate_config, validate_entry, validate_library_name, validate_umd_name, ValidationError,
};
