//! Minimal HTTP/1.1 GET client on hyper, with rustls for `https` URLs.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HOST, LOCATION, USER_AGENT};
use http::uri::PathAndQuery;
use http::{Request, Response, StatusCode, Uri};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::rt::{Read, Write};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::InstallError;

/// Redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

const AGENT: &str = concat!("install-gcs-connector/", env!("CARGO_PKG_VERSION"));

fn tls_connector() -> Result<TlsConnector, rustls::Error> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

async fn send<T>(io: T, request: Request<Empty<Bytes>>) -> hyper::Result<Response<Incoming>>
where
    T: Read + Write + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("HTTP connection closed with error: {}", e);
        }
    });
    sender.send_request(request).await
}

/// Issue a single GET without following redirects.
async fn get_once(uri: &Uri) -> Result<Response<Incoming>, InstallError> {
    let url = uri.to_string();
    let host = uri
        .host()
        .ok_or_else(|| InstallError::http(&url, "URL has no host"))?
        .to_string();
    let https = match uri.scheme_str() {
        Some("https") => true,
        Some("http") => false,
        other => {
            return Err(InstallError::http(
                &url,
                format!("unsupported scheme {:?}", other.unwrap_or("")),
            ));
        }
    };
    let port = uri.port_u16().unwrap_or(if https { 443 } else { 80 });
    let host_header = match uri.port_u16() {
        Some(p) => format!("{}:{}", host, p),
        None => host.clone(),
    };

    let request = Request::get(uri.path_and_query().map(|p| p.as_str()).unwrap_or("/"))
        .header(HOST, host_header)
        .header(USER_AGENT, AGENT)
        .body(Empty::<Bytes>::new())
        .map_err(|e| InstallError::http(&url, e))?;

    debug!("GET {}", url);
    let tcp = TcpStream::connect((host.as_str(), port))
        .await
        .map_err(|e| InstallError::http(&url, e))?;

    let response = if https {
        let connector = tls_connector().map_err(|e| InstallError::http(&url, e))?;
        let server_name =
            ServerName::try_from(host.clone()).map_err(|e| InstallError::http(&url, e))?;
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| InstallError::http(&url, e))?;
        send(TokioIo::new(tls), request).await
    } else {
        send(TokioIo::new(tcp), request).await
    };

    response.map_err(|e| InstallError::http(&url, e))
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri, InstallError> {
    let bad = |e: &dyn std::fmt::Display| {
        InstallError::http(base.to_string(), format!("bad redirect: {}", e))
    };

    if location.contains("://") {
        return location.parse().map_err(|e| bad(&e));
    }

    // Reference paths are relative to the directory of the current path.
    let path = if location.starts_with('/') {
        location.to_string()
    } else {
        let base_path = base.path();
        let dir = base_path.rfind('/').map_or("/", |i| &base_path[..=i]);
        format!("{}{}", dir, location)
    };

    let mut parts = base.clone().into_parts();
    parts.path_and_query = Some(path.parse::<PathAndQuery>().map_err(|e| bad(&e))?);
    Uri::from_parts(parts).map_err(|e| bad(&e))
}

/// GET `url`, following up to [`MAX_REDIRECTS`] redirects.
///
/// The response is returned whatever its final status; callers decide what
/// counts as success.
pub async fn get(url: &str) -> Result<Response<Incoming>, InstallError> {
    let mut uri: Uri = url.parse().map_err(|e| InstallError::http(url, e))?;

    for _ in 0..=MAX_REDIRECTS {
        let response = get_once(&uri).await?;
        if !response.status().is_redirection() {
            return Ok(response);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                InstallError::http(
                    uri.to_string(),
                    format!("{} without a Location header", response.status()),
                )
            })?;
        let next = resolve_location(&uri, location)?;
        debug!("{} redirected to {}", uri, next);
        uri = next;
    }

    Err(InstallError::http(url, "too many redirects"))
}

/// Turn a non-2xx response into an error.
pub fn ensure_success(url: &str, status: StatusCode) -> Result<(), InstallError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(InstallError::http(url, format!("HTTP {}", status)))
    }
}
