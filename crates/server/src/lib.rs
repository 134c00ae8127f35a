pub mod errors;
pub mod http;
pub mod routes;
pub mod startup;

pub use startup::{build, run, App, Started};
