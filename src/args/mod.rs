//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::TesterArgs;
pub use types::{HttpMethod, PositiveUsize};

pub use defaults::default_output_name;
pub use parsers::validate_target_url;

pub(crate) use defaults::DEFAULT_USER_AGENT;
pub(crate) use parsers::parse_header;
