//! Pieces shared by every crate in the workspace: logging setup and the
//! small JSON payloads the HTTP layer returns.

pub mod types;
pub mod utils;
