//! Detection of Dataproc VMs through the GCE metadata server.

use std::time::Duration;

use http_body_util::BodyExt;
use tracing::debug;

use super::client::{ensure_success, get};
use crate::error::InstallError;

/// Body prefix of the `dataproc-bucket` attribute on Dataproc VMs.
const DATAPROC_PREFIX: &str = "dataproc";

async fn fetch_attribute(url: &str) -> Result<String, InstallError> {
    let response = get(url).await?;
    ensure_success(url, response.status())?;

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| InstallError::http(url, e))?
        .to_bytes();

    String::from_utf8(body.to_vec()).map_err(|e| InstallError::http(url, e))
}

/// Whether this machine is a Dataproc VM, which ships with the GCS connector.
///
/// Any failure, including the timeout elapsing, means "no".
pub async fn is_dataproc_vm(metadata_url: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, fetch_attribute(metadata_url)).await {
        Ok(Ok(value)) => value.starts_with(DATAPROC_PREFIX),
        Ok(Err(e)) => {
            debug!("Metadata probe failed: {}", e);
            false
        }
        Err(_) => {
            debug!("Metadata probe timed out after {:?}", timeout);
            false
        }
    }
}
