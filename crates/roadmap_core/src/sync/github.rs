//! GitHub Contents API client for product snapshots.
//!
//! # Responsibility
//! - List, pull and push `scored-roadmaps/<sanitized>.json` files.
//! - Transcode snapshot JSON to/from base64 over UTF-8.
//! - Carry the prior blob sha on updates (optimistic concurrency).
//!
//! # Invariants
//! - 404 on list means "no products"; 404 on pull is `NotFound`.
//! - 401/403 always surface as `Auth`.
//! - The token is sent only in the `Authorization` header, never logged.

use crate::config::GitHubConfig;
use crate::model::product::Product;
use crate::sync::error::{RemoteError, RemoteResult};
use crate::sync::naming::{display_name_from_file, remote_product_path, REMOTE_ROOT_DIR};
use crate::sync::remote::{ProductRemote, PushReceipt, PushRequest};
use crate::sync::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";
const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: Option<PutContentInfo>,
}

#[derive(Debug, Deserialize)]
struct PutContentInfo {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Contents API client bound to one repository and branch.
pub struct GitHubContentClient<T: HttpTransport = ReqwestTransport> {
    config: GitHubConfig,
    transport: T,
}

impl GitHubContentClient<ReqwestTransport> {
    pub fn new(config: GitHubConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> GitHubContentClient<T> {
    pub fn with_transport(config: GitHubConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn read_request(&self, path: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.config.contents_url(path))
            .query("ref", &self.config.branch)
            .header("Authorization", &format!("Bearer {}", self.config.token))
            .header("Accept", ACCEPT_GITHUB_V3)
            .header("User-Agent", &self.config.user_agent)
    }

    async fn send(&self, request: HttpRequest) -> RemoteResult<HttpResponse> {
        self.transport
            .send(request)
            .await
            .map_err(|failure| RemoteError::Transport {
                status: None,
                message: failure.0,
            })
    }

    /// Looks up the current blob sha of `path`, if the file exists.
    ///
    /// Only auth failures abort; any other lookup failure falls through to
    /// a create attempt and lets the PUT report the real problem.
    async fn existing_sha(&self, path: &str) -> RemoteResult<Option<String>> {
        let response = match self.send(self.read_request(path)).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=remote_sha_lookup module=sync status=degraded path={path} error_code={}",
                    err.code()
                );
                return Ok(None);
            }
        };

        if response.is_success() {
            return match serde_json::from_str::<FileContent>(&response.body) {
                Ok(file) => Ok(Some(file.sha)),
                Err(err) => {
                    warn!(
                        "event=remote_sha_lookup module=sync status=degraded path={path} error_code=parse error={err}"
                    );
                    Ok(None)
                }
            };
        }
        match response.status {
            401 | 403 => Err(RemoteError::Auth {
                status: response.status,
            }),
            404 => Ok(None),
            status => {
                warn!(
                    "event=remote_sha_lookup module=sync status=degraded path={path} http_status={status}"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> ProductRemote for GitHubContentClient<T> {
    async fn list_products(&self) -> RemoteResult<Vec<String>> {
        let started_at = Instant::now();
        let response = self.send(self.read_request(REMOTE_ROOT_DIR)).await?;

        if response.status == 404 {
            info!(
                "event=remote_list module=sync status=ok count=0 reason=directory_missing duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(Vec::new());
        }
        if !response.is_success() {
            let err = error_for_status(REMOTE_ROOT_DIR, &response);
            warn!(
                "event=remote_list module=sync status=error error_code={} http_status={} duration_ms={}",
                err.code(),
                response.status,
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        let entries: Vec<DirectoryEntry> = serde_json::from_str(&response.body)
            .map_err(|err| RemoteError::Parse(format!("directory listing: {err}")))?;
        let names: Vec<String> = entries
            .iter()
            .filter(|entry| entry.kind == "file")
            .filter_map(|entry| display_name_from_file(&entry.name))
            .collect();

        info!(
            "event=remote_list module=sync status=ok count={} duration_ms={}",
            names.len(),
            started_at.elapsed().as_millis()
        );
        Ok(names)
    }

    async fn pull_product(&self, name: &str) -> RemoteResult<Product> {
        let started_at = Instant::now();
        let path = remote_product_path(name);
        let response = self.send(self.read_request(&path)).await?;

        if !response.is_success() {
            let err = error_for_status(&path, &response);
            warn!(
                "event=remote_pull module=sync status=error path={path} error_code={} http_status={} duration_ms={}",
                err.code(),
                response.status,
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        let file: FileContent = serde_json::from_str(&response.body)
            .map_err(|err| RemoteError::Parse(format!("file envelope for `{path}`: {err}")))?;
        let text = decode_base64_utf8(&file.content)?;
        let product: Product = serde_json::from_str(&text)
            .map_err(|err| RemoteError::Parse(format!("product json in `{path}`: {err}")))?;

        info!(
            "event=remote_pull module=sync status=ok path={path} initiatives={} duration_ms={}",
            product.initiatives.len(),
            started_at.elapsed().as_millis()
        );
        Ok(product)
    }

    async fn push_product(
        &self,
        product: &Product,
        request: &PushRequest,
    ) -> RemoteResult<PushReceipt> {
        request.validate()?;
        let started_at = Instant::now();
        let path = remote_product_path(&product.name);
        let sha = self.existing_sha(&path).await?;

        let json = serde_json::to_string_pretty(product)
            .map_err(|err| RemoteError::Parse(format!("serialize product: {err}")))?;
        let commit_message = request.commit_message(&product.name);
        let body = PutContentBody {
            message: &commit_message,
            content: encode_base64_utf8(&json),
            branch: &self.config.branch,
            sha: sha.as_deref(),
        };
        let body = serde_json::to_string(&body)
            .map_err(|err| RemoteError::Parse(format!("serialize commit body: {err}")))?;

        let put = HttpRequest::new(HttpMethod::Put, self.config.contents_url(&path))
            .header("Authorization", &format!("Bearer {}", self.config.token))
            .header("Accept", ACCEPT_GITHUB_V3)
            .header("User-Agent", &self.config.user_agent)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .body(body);
        let response = self.send(put).await?;

        if !response.is_success() {
            let err = match response.status {
                401 | 403 => RemoteError::Auth {
                    status: response.status,
                },
                status => RemoteError::Transport {
                    status: Some(status),
                    message: remote_message(&response.body),
                },
            };
            warn!(
                "event=remote_push module=sync status=error path={path} error_code={} http_status={} duration_ms={}",
                err.code(),
                response.status,
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        let content_sha = serde_json::from_str::<PutContentResponse>(&response.body)
            .ok()
            .and_then(|parsed| parsed.content)
            .and_then(|content| content.sha);
        info!(
            "event=remote_push module=sync status=ok path={path} created={} duration_ms={}",
            sha.is_none(),
            started_at.elapsed().as_millis()
        );
        Ok(PushReceipt {
            path,
            commit_message,
            created: sha.is_none(),
            content_sha,
        })
    }
}

fn error_for_status(path: &str, response: &HttpResponse) -> RemoteError {
    match response.status {
        404 => RemoteError::NotFound {
            path: path.to_string(),
        },
        401 | 403 => RemoteError::Auth {
            status: response.status,
        },
        status => RemoteError::Transport {
            status: Some(status),
            message: remote_message(&response.body),
        },
    }
}

fn remote_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Encodes text as UTF-8 bytes, then standard base64.
pub fn encode_base64_utf8(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes standard base64 (line breaks allowed) into UTF-8 text.
pub fn decode_base64_utf8(encoded: &str) -> RemoteResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| RemoteError::Parse(format!("base64: {err}")))?;
    String::from_utf8(bytes).map_err(|err| RemoteError::Parse(format!("utf-8: {err}")))
}
