//! Generation of the packaged application's project files.
//!
//! Pure data transformation: [`BuildConfig`](crate::config::BuildConfig)
//! in, a list of files to write out. No I/O happens here.

mod entry;
mod manifest;
mod naming;
mod project;
mod shell;

pub use manifest::manifest_json;
pub use naming::{app_identifier, product_name, sanitize_package_name};
pub use project::generate_project;
