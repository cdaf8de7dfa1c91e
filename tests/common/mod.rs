//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nf_location::config::{EndpointConfig, EndpointRole, HttpVersion, NodeConfig, NodeKind, TlsConfig};
use nf_location::lifecycle::{GroupReport, Shutdown};
use nf_location::Node;
use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// NF1 listening on `api`/`notification`, calling NF2 at `remote`.
pub fn nf1_config(api: u16, notification: u16, remote: &str, version: HttpVersion) -> NodeConfig {
    let mut config = NodeConfig {
        endpoints: vec![
            EndpointConfig::new(format!("127.0.0.1:{}", api), EndpointRole::Api),
            EndpointConfig::new(format!("127.0.0.1:{}", notification), EndpointRole::Notification),
        ],
        remote_api_root: Some(remote.to_string()),
        local_api_root_prefix: "localhost".to_string(),
        http_version: version,
        ..NodeConfig::default()
    };
    config.timeouts.correlation_secs = 5;
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// NF2 listening on `port`, following up after `delay_ms`.
pub fn nf2_config(port: u16, delay_ms: u64, version: HttpVersion) -> NodeConfig {
    let mut config = NodeConfig {
        endpoints: vec![EndpointConfig::new(format!("127.0.0.1:{}", port), EndpointRole::Nf)],
        local_api_root_prefix: "localhost".to_string(),
        http_version: version,
        ..NodeConfig::default()
    };
    config.timeouts.follow_up_delay_ms = delay_ms;
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// A node running in the background.
pub struct RunningNode {
    pub shutdown: Shutdown,
    pub task: JoinHandle<GroupReport>,
}

impl RunningNode {
    /// Fire shutdown and wait for the supervisor's report.
    pub async fn stop(self) -> GroupReport {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("node should stop in time")
            .expect("node task should not panic")
    }
}

/// Build and run `kind`, returning once every server has bound.
pub async fn spawn_node(kind: NodeKind, config: NodeConfig) -> RunningNode {
    let shutdown = Shutdown::new();
    let node = Node::build(kind, Arc::new(config), shutdown.clone()).expect("node should build");
    let stoppers = node.stoppers();
    let task = tokio::spawn(node.run());

    for stopper in stoppers {
        let bound = tokio::time::timeout(Duration::from_secs(5), stopper.listening())
            .await
            .expect("server should bind in time");
        assert!(bound.is_some(), "{} failed to bind", stopper.name());
    }

    RunningNode { shutdown, task }
}

/// Dev CA plus a server certificate for localhost, written to a temp dir.
pub struct TestPki {
    pub dir: TempDir,
    pub ca_pem: String,
}

impl TestPki {
    pub fn generate() -> Self {
        let mut ca_params = CertificateParams::default();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "NF Test CA");
        ca_params.distinguished_name = dn;
        let ca_key = KeyPair::generate().unwrap();
        let ca_cert = ca_params.self_signed(&ca_key).unwrap();

        let mut params =
            CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "localhost");
        params.distinguished_name = dn;
        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &ca_cert, &ca_key).unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("root-ca-cert.pem"), ca_cert.pem()).unwrap();
        std::fs::write(dir.path().join("server-cert.pem"), cert.pem()).unwrap();
        std::fs::write(dir.path().join("server-key.pem"), key.serialize_pem()).unwrap();

        Self {
            dir,
            ca_pem: ca_cert.pem(),
        }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    pub fn ca_path(&self) -> PathBuf {
        self.dir.path().join("root-ca-cert.pem")
    }

    pub fn tls_config(&self) -> TlsConfig {
        TlsConfig {
            cert_path: self.path("server-cert.pem"),
            key_path: self.path("server-key.pem"),
            ca_cert_path: self.path("root-ca-cert.pem"),
        }
    }
}

/// Cleartext HTTP/1.1 test client.
pub fn plain_client() -> reqwest::Client {
    reqwest::Client::builder()
        .http1_only()
        .no_proxy()
        .build()
        .unwrap()
}

/// HTTP/2 test client trusting only `pki`'s CA.
pub fn tls_client(pki: &TestPki) -> reqwest::Client {
    nf_location::net::tls::install_crypto_provider();
    let ca = reqwest::Certificate::from_pem(pki.ca_pem.as_bytes()).unwrap();
    reqwest::Client::builder()
        .use_rustls_tls()
        .tls_built_in_root_certs(false)
        .add_root_certificate(ca)
        .http2_prior_knowledge()
        .no_proxy()
        .build()
        .unwrap()
}
