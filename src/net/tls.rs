//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Error type for trust store loading.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(String),

    #[error("invalid certificate in {path}: {source}")]
    Invalid {
        path: String,
        source: reqwest::Error,
    },
}

/// Install the ring provider as the process-wide rustls default.
///
/// Both the listener and the outbound client stacks link rustls, so the
/// provider has to be chosen explicitly. Repeated calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    install_crypto_provider();
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// Load every certificate in a PEM bundle as a client trust anchor.
pub fn load_ca_certificates(path: &Path) -> Result<Vec<reqwest::Certificate>, TlsError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| TlsError::Io {
        path: display.clone(),
        source,
    })?;

    let ders = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: display.clone(),
            source,
        })?;

    if ders.is_empty() {
        return Err(TlsError::NoCertificates(display));
    }

    ders.iter()
        .map(|der| {
            reqwest::Certificate::from_der(der.as_ref()).map_err(|source| TlsError::Invalid {
                path: display.clone(),
                source,
            })
        })
        .collect()
}
