use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// One authenticated server session per process invocation. The access
/// token, when the server issues one, is appended to every request; a
/// token-less login success is accepted for servers running without auth.
pub struct Session {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl Session {
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|err| ClientError::transport(&config.server_url, err))?;
        let base = Url::parse(config.server_url.trim_end_matches('/'))
            .map_err(|err| ClientError::parse("server URL", err))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::parse(
                "server URL",
                format!("{} has no path to extend", config.server_url),
            ));
        }
        let mut session = Session {
            http,
            base,
            token: None,
        };
        if !config.user.is_empty() {
            session.login(&config.user, &config.password)?;
        }
        Ok(session)
    }

    fn login(&mut self, user: &str, pass: &str) -> ClientResult<()> {
        let url = self.api_url(&["host", "login.json"])?;
        debug!(%url, user, "logging in");
        let response = self
            .http
            .post(url.clone())
            .form(&[("user", user), ("pass", pass)])
            .send()
            .map_err(|err| ClientError::transport(url.as_str(), err))?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::Authentication {
                user: user.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::transport(url.as_str(), status));
        }
        let doc: Value = response
            .json()
            .map_err(|err| ClientError::parse("login response", err))?;
        self.token = doc
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        debug!(token = self.token.is_some(), "login accepted");
        Ok(())
    }

    /// Build `<base>/api/<segments...>`, percent-encoding each segment.
    pub fn api_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::parse("server URL", "cannot extend path"))?;
            path.push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// The per-event video artifact endpoint on the web surface.
    pub fn video_url(&self, event_id: u64) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::parse("server URL", "cannot extend path"))?
            .push("index.php");
        url.query_pairs_mut()
            .append_pair("view", "view_video")
            .append_pair("eid", &event_id.to_string());
        Ok(url)
    }

    fn attach_token(&self, url: &mut Url) {
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
    }

    pub fn get_json(&self, mut url: Url) -> ClientResult<Value> {
        self.attach_token(&mut url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|err| ClientError::transport(url.as_str(), err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(url.as_str(), status));
        }
        response
            .json()
            .map_err(|err| ClientError::parse("server response", err))
    }

    pub fn post_form(&self, mut url: Url, fields: &[(String, String)]) -> ClientResult<()> {
        self.attach_token(&mut url);
        debug!(%url, fields = fields.len(), "POST");
        let response = self
            .http
            .post(url.clone())
            .form(fields)
            .send()
            .map_err(|err| ClientError::transport(url.as_str(), err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(url.as_str(), status));
        }
        Ok(())
    }

    pub fn download_to(&self, mut url: Url, dest: &Path) -> ClientResult<u64> {
        self.attach_token(&mut url);
        debug!(%url, dest = %dest.display(), "downloading");
        let mut response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|err| ClientError::transport(url.as_str(), err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(url.as_str(), status));
        }
        let mut file = std::fs::File::create(dest)
            .map_err(|err| ClientError::transport(url.as_str(), format!("{}: {err}", dest.display())))?;
        response
            .copy_to(&mut file)
            .map_err(|err| ClientError::transport(url.as_str(), err))
    }
}
