use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::VaultError;

/// Connection settings for a Vault server.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: String,
    pub namespace: Option<String>,
    pub timeout: Duration,
}

impl VaultConfig {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin client over the Vault HTTP API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    namespace: Option<String>,
}

impl VaultClient {
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        let base_url = Url::parse(config.address.trim_end_matches('/'))
            .map_err(|e| VaultError::InvalidAddress(format!("{}: {e}", config.address)))?;
        if base_url.cannot_be_a_base() {
            return Err(VaultError::InvalidAddress(config.address));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: config.token,
            namespace: config.namespace.filter(|ns| !ns.is_empty()),
        })
    }

    pub fn address(&self) -> &str {
        self.base_url.as_str()
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, VaultError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| VaultError::InvalidAddress(self.base_url.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .header("X-Vault-Token", &self.token);
        if let Some(namespace) = &self.namespace {
            req = req.header("X-Vault-Namespace", namespace);
        }
        req
    }

    /// Lists the names of every ACL policy.
    pub async fn list_policies(&self) -> Result<Vec<String>, VaultError> {
        let url = self.api_url(&["sys", "policy"])?;
        debug!(%url, "Listing policies");
        let resp = self.request(Method::GET, url).send().await?;
        let body = handle_response(resp).await?;

        let names = body
            .get("policies")
            .or_else(|| body.pointer("/data/policies"))
            .or_else(|| body.pointer("/data/keys"))
            .and_then(Value::as_array)
            .ok_or_else(|| VaultError::invalid_response("policy list has no 'policies' field"))?;

        names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| VaultError::invalid_response("policy name is not a string"))
            })
            .collect()
    }

    /// Reads the rules of a single policy.
    pub async fn read_policy(&self, name: &str) -> Result<String, VaultError> {
        let url = self.api_url(&["sys", "policy", name])?;
        debug!(%url, "Reading policy");
        let resp = self.request(Method::GET, url).send().await?;
        let body = handle_response(resp).await?;

        body.get("rules")
            .or_else(|| body.pointer("/data/rules"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                VaultError::invalid_response(format!("policy '{name}' has no 'rules' field"))
            })
    }

    /// Creates or fully replaces a policy.
    pub async fn put_policy(&self, name: &str, rules: &str) -> Result<(), VaultError> {
        let url = self.api_url(&["sys", "policy", name])?;
        let resp = self
            .request(Method::PUT, url)
            .json(&json!({ "policy": rules }))
            .send()
            .await?;
        handle_response(resp).await?;
        Ok(())
    }

    pub async fn delete_policy(&self, name: &str) -> Result<(), VaultError> {
        let url = self.api_url(&["sys", "policy", name])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        handle_response(resp).await?;
        Ok(())
    }
}

async fn handle_response(resp: Response) -> Result<Value, VaultError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        // Vault reports failures as {"errors": ["..."]}.
        if let Ok(json) = serde_json::from_str::<Value>(&body)
            && let Some(errors) = json.get("errors").and_then(Value::as_array)
        {
            let msgs: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
            if !msgs.is_empty() {
                return Err(VaultError::status(status.as_u16(), msgs.join("; ")));
            }
        }
        return Err(VaultError::status(status.as_u16(), body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body)
        .map_err(|e| VaultError::invalid_response(format!("failed to parse response JSON: {e}")))
}
