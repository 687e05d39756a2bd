//! Downloading the connector jar into `<spark_home>/jars`.

use std::path::{Path, PathBuf};

use http::Uri;
use http_body_util::BodyExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::client::{ensure_success, get};
use crate::error::InstallError;
use crate::utils::format_size;

/// Last path segment of `url`, e.g. `gcs-connector-hadoop2-1.9.17-shaded.jar`.
pub fn jar_file_name(url: &str) -> Result<String, InstallError> {
    let uri: Uri = url.parse().map_err(|e| InstallError::http(url, e))?;
    uri.path()
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| InstallError::validation(format!("URL {} does not name a file", url)))
}

/// Where the jar from `url` is placed under `spark_home`.
pub fn jar_destination(url: &str, spark_home: &Path) -> Result<PathBuf, InstallError> {
    Ok(spark_home.join("jars").join(jar_file_name(url)?))
}

async fn stream_to_file(url: &str, part: &Path) -> Result<u64, InstallError> {
    let response = get(url).await?;
    ensure_success(url, response.status())?;

    let mut body = response.into_body();
    let mut file = tokio::fs::File::create(part).await?;
    let mut written: u64 = 0;

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| InstallError::http(url, e))?;
        if let Some(chunk) = frame.data_ref() {
            file.write_all(chunk).await?;
            written += chunk.len() as u64;
        }
    }
    file.flush().await?;
    file.sync_all().await?;

    Ok(written)
}

/// Download `url` into `<spark_home>/jars/<file name>` and return that path.
///
/// The body is written to a `.part` file first and renamed into place once
/// complete, so a failed download never leaves a truncated jar behind.
pub async fn download_connector(url: &str, spark_home: &Path) -> Result<PathBuf, InstallError> {
    let destination = jar_destination(url, spark_home)?;
    let fail = |e: InstallError| InstallError::download(url, &destination, e);

    if let Some(jars_dir) = destination.parent()
        && !jars_dir.exists()
    {
        debug!("Creating {}", jars_dir.display());
        tokio::fs::create_dir_all(jars_dir)
            .await
            .map_err(|e| fail(e.into()))?;
    }

    info!("Downloading {} to {}", url, destination.display());

    let mut part = destination.clone().into_os_string();
    part.push(".part");
    let part = PathBuf::from(part);

    match stream_to_file(url, &part).await {
        Ok(size) => {
            tokio::fs::rename(&part, &destination)
                .await
                .map_err(|e| fail(e.into()))?;
            debug!("Wrote {} to {}", format_size(size), destination.display());
            Ok(destination)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            Err(fail(e))
        }
    }
}
