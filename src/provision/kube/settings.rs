use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::args::ChurnArgs;
use crate::error::ProvisionError;

use super::kubeconfig::{self, KubeconfigTarget};

const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";
const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_ACCOUNT_CA: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
const DEFAULT_SERVICE_PORT: &str = "443";

/// PEM material from a file or decoded from an inline kubeconfig field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemSource {
    File(PathBuf),
    /// `origin` is the kubeconfig the bytes were taken from.
    Inline { origin: PathBuf, pem: Vec<u8> },
}

impl PemSource {
    /// File named in error messages.
    #[must_use]
    pub fn origin(&self) -> &Path {
        match self {
            PemSource::File(path) => path,
            PemSource::Inline { origin, .. } => origin,
        }
    }

    pub(crate) fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            PemSource::File(path) => std::fs::read(path),
            PemSource::Inline { pem, .. } => Ok(pem.clone()),
        }
    }
}

/// Client certificate and key presented to the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub certificate: PemSource,
    pub key: PemSource,
}

/// Resolved connection settings of the Kubernetes provisioner.
#[derive(Debug, Clone)]
pub struct KubeSettings {
    pub api_server: Url,
    pub token: Option<String>,
    pub cacert: Option<PemSource>,
    pub identity: Option<ClientIdentity>,
    pub insecure: bool,
    pub image: String,
    pub scheduler_name: String,
    pub request_timeout: Duration,
}

impl KubeSettings {
    /// Resolves settings from CLI arguments, kubeconfig and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error when no API server can be determined, the kubeconfig
    /// is unusable, or the token file cannot be read.
    pub fn from_args(args: &ChurnArgs) -> Result<Self, ProvisionError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Like [`KubeSettings::from_args`] with an injectable environment lookup.
    ///
    /// The API server comes from `--api-server`, else the selected kubeconfig
    /// context, else the in-cluster service address. Kubeconfig is discovered
    /// only without `--api-server`; an explicit `--kubeconfig` is always read
    /// and lends its credentials to an explicit server. Explicit `--token-file`
    /// and `--cacert` win over kubeconfig and service account credentials.
    pub(crate) fn resolve<F>(args: &ChurnArgs, env: F) -> Result<Self, ProvisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kubeconfig_path = match (args.kubeconfig.as_deref(), args.api_server.is_some()) {
            (Some(explicit), _) => Some(PathBuf::from(explicit)),
            (None, false) => kubeconfig::discover(&env),
            (None, true) => None,
        };
        let target = kubeconfig_path
            .as_deref()
            .map(|path| kubeconfig::load(path, args.context.as_deref()))
            .transpose()?;

        let (raw_api_server, in_cluster) = match (args.api_server.as_deref(), target.as_ref()) {
            (Some(explicit), _) => (explicit.trim().to_owned(), false),
            (None, Some(target)) => (target.server.trim().to_owned(), false),
            (None, None) => (
                in_cluster_api_server(&env).ok_or(ProvisionError::MissingApiServer)?,
                true,
            ),
        };
        let api_server = parse_api_server(&raw_api_server)?;

        let token = resolve_token(args.token_file.as_deref(), target.as_ref(), in_cluster)?;

        let cacert = args
            .cacert
            .as_deref()
            .map(|path| PemSource::File(PathBuf::from(path)))
            .or_else(|| target.as_ref().and_then(|target| target.cacert.clone()))
            .or_else(|| {
                in_cluster
                    .then(|| PathBuf::from(SERVICE_ACCOUNT_CA))
                    .filter(|path| path.exists())
                    .map(PemSource::File)
            });

        Ok(Self {
            api_server,
            token,
            cacert,
            identity: target.as_ref().and_then(|target| target.identity.clone()),
            insecure: args.insecure || target.as_ref().is_some_and(|target| target.insecure),
            image: args.image.clone(),
            scheduler_name: args.scheduler_name.clone(),
            request_timeout: args.request_timeout,
        })
    }
}

fn resolve_token(
    explicit: Option<&str>,
    target: Option<&KubeconfigTarget>,
    in_cluster: bool,
) -> Result<Option<String>, ProvisionError> {
    if let Some(path) = explicit {
        return read_token(Path::new(path)).map(Some);
    }
    if let Some(target) = target {
        if let Some(token) = target.token.as_ref() {
            return Ok(Some(token.clone()));
        }
        return target.token_file.as_deref().map(read_token).transpose();
    }
    let service_account = Path::new(SERVICE_ACCOUNT_TOKEN);
    if in_cluster && service_account.exists() {
        return read_token(service_account).map(Some);
    }
    Ok(None)
}

fn in_cluster_api_server<F>(env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = env(SERVICE_HOST_ENV).filter(|host| !host.trim().is_empty())?;
    let port = env(SERVICE_PORT_ENV)
        .filter(|port| !port.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICE_PORT.to_owned());
    let host = host.trim();
    if host.contains(':') {
        Some(format!("https://[{}]:{}", host, port.trim()))
    } else {
        Some(format!("https://{}:{}", host, port.trim()))
    }
}

fn parse_api_server(raw: &str) -> Result<Url, ProvisionError> {
    let url = Url::parse(raw).map_err(|err| ProvisionError::InvalidApiServer {
        url: raw.to_owned(),
        source: err,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProvisionError::UnsupportedScheme {
            url: raw.to_owned(),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ProvisionError::ApiServerNotBase {
            url: raw.to_owned(),
        });
    }
    Ok(url)
}

fn read_token(path: &Path) -> Result<String, ProvisionError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ProvisionError::ReadToken {
        path: path.to_path_buf(),
        source: err,
    })?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(ProvisionError::EmptyToken {
            path: path.to_path_buf(),
        });
    }
    Ok(token.to_owned())
}
