use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Provisioner operation an error was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOp {
    Create,
    Delete,
    Preflight,
}

impl ProvisionOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProvisionOp::Create => "create",
            ProvisionOp::Delete => "delete",
            ProvisionOp::Preflight => "preflight",
        }
    }
}

impl fmt::Display for ProvisionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("No API server configured (set --api-server or run inside a cluster).")]
    MissingApiServer,
    #[error("Invalid API server URL '{url}': {source}")]
    InvalidApiServer {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to read token file '{path}': {source}")]
    ReadToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Token file '{path}' is empty.")]
    EmptyToken { path: PathBuf },
    #[error("Failed to read CA certificate '{path}': {source}")]
    ReadCacert {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid CA certificate '{path}': {source}")]
    InvalidCacert {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read client credential '{path}': {source}")]
    ReadClientCredential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid client certificate or key from '{path}' (keys must be PKCS#8 PEM): {source}")]
    InvalidClientIdentity {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read kubeconfig '{path}': {source}")]
    ReadKubeconfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid kubeconfig '{path}': {source}")]
    ParseKubeconfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Kubeconfig '{path}' has no current context (set one or pass --context).")]
    NoCurrentContext { path: PathBuf },
    #[error("Kubeconfig '{path}' has no {kind} named '{name}'.")]
    MissingKubeconfigEntry {
        path: PathBuf,
        kind: &'static str,
        name: String,
    },
    #[error("Kubeconfig '{path}' field '{field}' is not valid base64: {source}")]
    InvalidKubeconfigData {
        path: PathBuf,
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("Kubeconfig '{path}' needs both a client certificate and a client key.")]
    IncompleteClientIdentity { path: PathBuf },
    #[error("Failed to build API client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("API server URL '{url}' must use http or https.")]
    UnsupportedScheme { url: String },
    #[error("API server URL '{url}' cannot carry a resource path.")]
    ApiServerNotBase { url: String },
    #[error("{op} '{name}' request failed: {source}")]
    Request {
        op: ProvisionOp,
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op} '{name}' returned HTTP {status}: {body}")]
    Status {
        op: ProvisionOp,
        name: String,
        status: u16,
        body: String,
    },
    #[error("Work unit '{name}' already exists.")]
    AlreadyExists { name: String },
    #[error("Work unit '{name}' not found.")]
    NotFound { name: String },
    #[error("Injected {op} failure for '{name}'.")]
    Injected { op: ProvisionOp, name: String },
    #[error("Provisioner state lock poisoned.")]
    StatePoisoned,
}
