//! Small helpers shared by the client and the CLI.
//!
//! - **Base URL policy**: where the API key is allowed to be sent
//! - **Terminal text**: sanitising and width-aware truncation of API strings

mod text;
mod url_validator;

pub use text::{sanitize_line, truncate_to_width};
pub use url_validator::{validate_base_url, BaseUrlError};
