//! GitHub REST client for repository create / delete.
//!
//! One outbound call per operation (two for delete when the owner has to be
//! looked up). Non-success responses are returned with their raw JSON body so
//! the handler can surface GitHub's own error text.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::GitHubConfig;

const USER_AGENT: &str = concat!("event-assistant/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
pub const REPO_DESCRIPTION: &str = "A repository created through API.";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GITHUB_TOKEN is not configured")]
    MissingToken,
    #[error("GitHub request failed: {0}")]
    Transport(String),
    #[error("malformed GitHub response: {0}")]
    Malformed(String),
    #[error("GitHub API returned {status}")]
    Api { status: u16, body: Value },
}

impl GitHubError {
    pub fn kind(&self) -> &'static str {
        match self {
            GitHubError::MissingToken => "config",
            GitHubError::Transport(_) => "transport",
            GitHubError::Malformed(_) => "malformed",
            GitHubError::Api { .. } => "provider",
        }
    }

    /// Raw API body, when GitHub answered.
    pub fn details(&self) -> Option<&Value> {
        match self {
            GitHubError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRepo {
    pub name: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    owner: Option<String>,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            owner: config.owner.clone(),
            token,
        })
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, GitHubError> {
        let token = self.token.as_deref().ok_or(GitHubError::MissingToken)?;
        Ok(req
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    /// `POST /user/repos`. Success is signalled by a `name` in the response.
    pub async fn create_repo(&self, name: &str) -> Result<CreatedRepo, GitHubError> {
        let url = format!("{}/user/repos", self.api_base_url);
        let body = CreateRepoRequest { name, description: REPO_DESCRIPTION, private: false };
        let req = self.authorized(self.client.post(&url).json(&body))?;

        debug!(repo = %name, "creating GitHub repository");
        let (status, value) = send_json(req).await?;

        match value.get("name").and_then(Value::as_str) {
            Some(created) => {
                info!(repo = %created, "GitHub repository created");
                Ok(CreatedRepo {
                    name: created.to_string(),
                    html_url: value.get("html_url").and_then(Value::as_str).map(str::to_string),
                })
            }
            None => {
                warn!(%status, repo = %name, "GitHub create did not return a repository");
                Err(GitHubError::Api { status: status.as_u16(), body: value })
            }
        }
    }

    /// `DELETE /repos/{owner}/{name}`. Only 204 counts as success.
    ///
    /// Returns the `owner/name` that was removed.
    pub async fn delete_repo(&self, name: &str) -> Result<String, GitHubError> {
        let owner = match &self.owner {
            Some(owner) => owner.clone(),
            None => self.authenticated_login().await?,
        };
        let full_name = format!("{owner}/{name}");
        let url = format!("{}/repos/{full_name}", self.api_base_url);
        let req = self.authorized(self.client.delete(&url))?;

        debug!(repo = %full_name, "deleting GitHub repository");
        let (status, value) = send_json(req).await?;

        if status == StatusCode::NO_CONTENT {
            info!(repo = %full_name, "GitHub repository deleted");
            Ok(full_name)
        } else {
            warn!(%status, repo = %full_name, "GitHub delete failed");
            Err(GitHubError::Api { status: status.as_u16(), body: value })
        }
    }

    /// `GET /user` → `login` of the token's account.
    async fn authenticated_login(&self) -> Result<String, GitHubError> {
        let url = format!("{}/user", self.api_base_url);
        let req = self.authorized(self.client.get(&url))?;
        let (status, value) = send_json(req).await?;

        if !status.is_success() {
            return Err(GitHubError::Api { status: status.as_u16(), body: value });
        }
        value
            .get("login")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GitHubError::Malformed("GET /user response has no 'login'".into()))
    }
}

/// Send and read the body as JSON. Empty bodies become `null`; non-JSON
/// bodies are kept as a string so nothing GitHub said is lost.
async fn send_json(req: RequestBuilder) -> Result<(StatusCode, Value), GitHubError> {
    let response = req.send().await.map_err(|e| {
        error!(error = %e, "GitHub HTTP request failed (transport)");
        GitHubError::Transport(e.to_string())
    })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GitHubError::Transport(format!("failed to read response body: {e}")))?;

    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok((status, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, owner: Option<&str>, token: Option<&str>) -> GitHubClient {
        let cfg = GitHubConfig {
            api_base_url: server.uri(),
            owner: owner.map(str::to_string),
            timeout_seconds: 5,
        };
        GitHubClient::new(&cfg, token.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn create_repo_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer ghp-test"))
            .and(body_json(json!({
                "name": "foo-bar",
                "description": "A repository created through API.",
                "private": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "foo-bar",
                "html_url": "https://github.com/octo/foo-bar"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client(&server, None, Some("ghp-test")).create_repo("foo-bar").await.unwrap();
        assert_eq!(repo.name, "foo-bar");
        assert_eq!(repo.html_url.as_deref(), Some("https://github.com/octo/foo-bar"));
    }

    #[tokio::test]
    async fn create_repo_surfaces_api_error() {
        let server = MockServer::start().await;
        let error_body = json!({
            "message": "Repository creation failed.",
            "errors": [{"field": "name", "message": "name already exists on this account"}]
        });
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(error_body.clone()))
            .mount(&server)
            .await;

        let err = client(&server, None, Some("t")).create_repo("dup").await.unwrap_err();
        assert_eq!(err.kind(), "provider");
        assert_eq!(err.details(), Some(&error_body));
        assert!(matches!(err, GitHubError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn missing_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(201)).expect(0).mount(&server).await;

        let err = client(&server, None, None).create_repo("x").await.unwrap_err();
        assert!(matches!(err, GitHubError::MissingToken));
    }

    #[tokio::test]
    async fn delete_repo_with_configured_owner() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/octo-org/my_repo"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let removed = client(&server, Some("octo-org"), Some("t")).delete_repo("my_repo").await.unwrap();
        assert_eq!(removed, "octo-org/my_repo");
    }

    #[tokio::test]
    async fn delete_repo_resolves_owner_from_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/repos/octocat/my_repo"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let removed = client(&server, None, Some("t")).delete_repo("my_repo").await.unwrap();
        assert_eq!(removed, "octocat/my_repo");
    }

    #[tokio::test]
    async fn delete_repo_non_204_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/octo/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let err = client(&server, Some("octo"), Some("t")).delete_repo("ghost").await.unwrap_err();
        match err {
            GitHubError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body["message"], "Not Found");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_repo_success_status_without_name_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "huh"})))
            .mount(&server)
            .await;

        let err = client(&server, None, Some("t")).create_repo("x").await.unwrap_err();
        match err {
            GitHubError::Api { status, body } => {
                assert_eq!(status, 201);
                assert_eq!(body, json!({"message": "huh"}));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_repo_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/octo/x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, Some("octo"), Some("t")).delete_repo("x").await.unwrap_err();
        assert_eq!(err.kind(), "provider");
        assert!(matches!(err, GitHubError::Api { status: 200, .. }));
    }

    #[tokio::test]
    async fn unreachable_is_transport() {
        let cfg = GitHubConfig { api_base_url: "http://127.0.0.1:1".into(), owner: None, timeout_seconds: 1 };
        let c = GitHubClient::new(&cfg, Some("t".into())).unwrap();
        assert!(matches!(c.create_repo("x").await, Err(GitHubError::Transport(_))));
    }
}
