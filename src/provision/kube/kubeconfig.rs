use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::ProvisionError;

use super::settings::{ClientIdentity, PemSource};

const KUBECONFIG_ENV: &str = "KUBECONFIG";
const HOME_ENV: &str = "HOME";

/// Endpoint and credentials of one kubeconfig context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KubeconfigTarget {
    pub server: String,
    pub cacert: Option<PemSource>,
    pub insecure: bool,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub identity: Option<ClientIdentity>,
}

/// First existing entry of `$KUBECONFIG`, else `$HOME/.kube/config` when present.
pub(crate) fn discover<F>(env: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(list) = env(KUBECONFIG_ENV)
        && let Some(found) = std::env::split_paths(&list)
            .find(|path| !path.as_os_str().is_empty() && path.is_file())
    {
        return Some(found);
    }
    let home = env(HOME_ENV).filter(|home| !home.trim().is_empty())?;
    Some(Path::new(&home).join(".kube").join("config")).filter(|path| path.is_file())
}

/// Reads `path` and resolves `context`, or the current context when `None`.
///
/// Relative file references are resolved against the kubeconfig's directory.
/// Inline `*-data` fields win over their file counterparts.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, the context,
/// cluster or user it names is missing, or an inline field is not base64.
pub(crate) fn load(path: &Path, context: Option<&str>) -> Result<KubeconfigTarget, ProvisionError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ProvisionError::ReadKubeconfig {
        path: path.to_path_buf(),
        source: err,
    })?;
    let config: Kubeconfig =
        serde_yaml::from_str(&raw).map_err(|err| ProvisionError::ParseKubeconfig {
            path: path.to_path_buf(),
            source: err,
        })?;
    config.target(path, context)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    users: Vec<NamedUser>,
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: Cluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    server: String,
    certificate_authority: Option<String>,
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Debug, Deserialize)]
struct Context {
    cluster: String,
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct User {
    token: Option<String>,
    #[serde(rename = "tokenFile")]
    token_file: Option<String>,
    client_certificate: Option<String>,
    client_certificate_data: Option<String>,
    client_key: Option<String>,
    client_key_data: Option<String>,
}

impl Kubeconfig {
    fn target(&self, origin: &Path, context: Option<&str>) -> Result<KubeconfigTarget, ProvisionError> {
        let context_name = context
            .or(self.current_context.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProvisionError::NoCurrentContext {
                path: origin.to_path_buf(),
            })?;
        let selected = &self
            .contexts
            .iter()
            .find(|entry| entry.name == context_name)
            .ok_or_else(|| missing_entry(origin, "context", context_name))?
            .context;
        let cluster = &self
            .clusters
            .iter()
            .find(|entry| entry.name == selected.cluster)
            .ok_or_else(|| missing_entry(origin, "cluster", &selected.cluster))?
            .cluster;
        let user = match selected.user.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => Some(
                &self
                    .users
                    .iter()
                    .find(|entry| entry.name == name)
                    .ok_or_else(|| missing_entry(origin, "user", name))?
                    .user,
            ),
            None => None,
        };

        let cacert = pem_source(
            origin,
            cluster.certificate_authority.as_deref(),
            cluster.certificate_authority_data.as_deref(),
            "certificate-authority-data",
        )?;

        let mut target = KubeconfigTarget {
            server: cluster.server.clone(),
            cacert,
            insecure: cluster.insecure_skip_tls_verify,
            token: None,
            token_file: None,
            identity: None,
        };
        if let Some(user) = user {
            target.token = non_empty(user.token.as_deref()).map(str::to_owned);
            target.token_file = non_empty(user.token_file.as_deref())
                .map(|file| relative_to(origin, file));
            target.identity = client_identity(origin, user)?;
        }
        Ok(target)
    }
}

fn client_identity(origin: &Path, user: &User) -> Result<Option<ClientIdentity>, ProvisionError> {
    let certificate = pem_source(
        origin,
        user.client_certificate.as_deref(),
        user.client_certificate_data.as_deref(),
        "client-certificate-data",
    )?;
    let key = pem_source(
        origin,
        user.client_key.as_deref(),
        user.client_key_data.as_deref(),
        "client-key-data",
    )?;
    match (certificate, key) {
        (Some(certificate), Some(key)) => Ok(Some(ClientIdentity { certificate, key })),
        (None, None) => Ok(None),
        _ => Err(ProvisionError::IncompleteClientIdentity {
            path: origin.to_path_buf(),
        }),
    }
}

fn pem_source(
    origin: &Path,
    file: Option<&str>,
    data: Option<&str>,
    field: &'static str,
) -> Result<Option<PemSource>, ProvisionError> {
    if let Some(data) = non_empty(data) {
        let pem = STANDARD
            .decode(data)
            .map_err(|err| ProvisionError::InvalidKubeconfigData {
                path: origin.to_path_buf(),
                field,
                source: err,
            })?;
        return Ok(Some(PemSource::Inline {
            origin: origin.to_path_buf(),
            pem,
        }));
    }
    Ok(non_empty(file).map(|file| PemSource::File(relative_to(origin, file))))
}

fn relative_to(origin: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    origin
        .parent()
        .map_or_else(|| file.to_path_buf(), |dir| dir.join(file))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn missing_entry(origin: &Path, kind: &'static str, name: &str) -> ProvisionError {
    ProvisionError::MissingKubeconfigEntry {
        path: origin.to_path_buf(),
        kind,
        name: name.to_owned(),
    }
}
