mod kubeconfig;
mod manifest;
mod settings;


use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{ProvisionError, ProvisionOp};

use super::{Provisioner, WorkUnitHandle, WorkUnitSpec};
use manifest::{DeleteOptions, PodManifest};

pub use settings::{ClientIdentity, KubeSettings, PemSource};

/// Longest slice of an error response body carried into the error.
const ERROR_BODY_LIMIT: usize = 256;

/// Churns pods through the Kubernetes core/v1 REST API.
#[derive(Debug, Clone)]
pub struct KubeProvisioner {
    client: Client,
    api_server: Url,
    token: Option<String>,
    image: String,
    scheduler_name: String,
    preflight_scope: String,
}

impl KubeProvisioner {
    /// Builds the HTTP client for the resolved settings.
    ///
    /// `preflight_scope` is the namespace listed by [`Provisioner::preflight`].
    ///
    /// # Errors
    ///
    /// Returns an error when the CA bundle or the client identity cannot be
    /// loaded, or the client cannot be built.
    pub fn new(settings: KubeSettings, preflight_scope: &str) -> Result<Self, ProvisionError> {
        let mut builder = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(DEFAULT_USER_AGENT);

        if let Some(source) = settings.cacert.as_ref() {
            let bytes = source.read().map_err(|err| ProvisionError::ReadCacert {
                path: source.origin().to_path_buf(),
                source: err,
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
                ProvisionError::InvalidCacert {
                    path: source.origin().to_path_buf(),
                    source: err,
                }
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(identity) = settings.identity.as_ref() {
            builder = builder.identity(load_identity(identity)?);
        }

        if settings.insecure {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = builder
            .build()
            .map_err(|err| ProvisionError::BuildClient { source: err })?;

        Ok(Self {
            client,
            api_server: settings.api_server,
            token: settings.token,
            image: settings.image,
            scheduler_name: settings.scheduler_name,
            preflight_scope: preflight_scope.to_owned(),
        })
    }

    fn pods_url(&self, scope: &str, name: Option<&str>) -> Result<Url, ProvisionError> {
        let mut url = self.api_server.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| ProvisionError::ApiServerNotBase {
                        url: self.api_server.to_string(),
                    })?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "namespaces", scope, "pods"]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.token.as_deref() {
            return request.bearer_auth(token);
        }
        request
    }
}

#[async_trait]
impl Provisioner for KubeProvisioner {
    fn name(&self) -> &'static str {
        "kube"
    }

    async fn preflight(&self) -> Result<(), ProvisionError> {
        let scope = self.preflight_scope.as_str();
        let url = self.pods_url(scope, None)?;
        let response = self
            .authorize(self.client.get(url))
            .query(&[("limit", "1")])
            .send()
            .await
            .map_err(|err| ProvisionError::Request {
                op: ProvisionOp::Preflight,
                name: scope.to_owned(),
                source: err,
            })?;
        if !response.status().is_success() {
            return Err(status_error(ProvisionOp::Preflight, scope, response).await);
        }
        Ok(())
    }

    async fn create(&self, spec: &WorkUnitSpec) -> Result<WorkUnitHandle, ProvisionError> {
        let url = self.pods_url(&spec.scope, None)?;
        let manifest = PodManifest::for_unit(spec, &self.image, &self.scheduler_name);
        let response = self
            .authorize(self.client.post(url))
            .json(&manifest)
            .send()
            .await
            .map_err(|err| ProvisionError::Request {
                op: ProvisionOp::Create,
                name: spec.name.clone(),
                source: err,
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(ProvisionError::AlreadyExists {
                name: spec.name.clone(),
            });
        }
        if !status.is_success() {
            return Err(status_error(ProvisionOp::Create, &spec.name, response).await);
        }
        Ok(WorkUnitHandle::for_spec(spec))
    }

    async fn delete(&self, handle: &WorkUnitHandle) -> Result<(), ProvisionError> {
        let url = self.pods_url(&handle.scope, Some(&handle.name))?;
        let response = self
            .authorize(self.client.delete(url))
            .query(&[("gracePeriodSeconds", "0")])
            .json(&DeleteOptions::immediate())
            .send()
            .await
            .map_err(|err| ProvisionError::Request {
                op: ProvisionOp::Delete,
                name: handle.name.clone(),
                source: err,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProvisionError::NotFound {
                name: handle.name.clone(),
            });
        }
        if !status.is_success() {
            return Err(status_error(ProvisionOp::Delete, &handle.name, response).await);
        }
        Ok(())
    }
}

fn load_identity(identity: &ClientIdentity) -> Result<reqwest::Identity, ProvisionError> {
    let read = |source: &PemSource| {
        source
            .read()
            .map_err(|err| ProvisionError::ReadClientCredential {
                path: source.origin().to_path_buf(),
                source: err,
            })
    };
    let certificate = read(&identity.certificate)?;
    let key = read(&identity.key)?;
    reqwest::Identity::from_pkcs8_pem(&certificate, &key).map_err(|err| {
        ProvisionError::InvalidClientIdentity {
            path: identity.certificate.origin().to_path_buf(),
            source: err,
        }
    })
}

async fn status_error(op: ProvisionOp, name: &str, response: Response) -> ProvisionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProvisionError::Status {
        op,
        name: name.to_owned(),
        status,
        body: body.trim().chars().take(ERROR_BODY_LIMIT).collect(),
    }
}
