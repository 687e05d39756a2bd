//! Network access: the metadata probe and the connector download.

pub mod client;
mod download;
mod metadata;

pub use download::{download_connector, jar_destination, jar_file_name};
pub use metadata::is_dataproc_vm;
