use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// Where the local backend listens when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/run-agent";

/// Body returned by `GET /run-agent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_text: Option<String>,
}

impl AgentReply {
    pub fn new(user_text: Option<&str>, bot_text: Option<&str>) -> Self {
        Self {
            user_text: user_text.map(str::to_string),
            bot_text: bot_text.map(str::to_string),
        }
    }
}

/// Something that can run one record/transcribe/reply cycle
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn run_agent(&self) -> AgentResult<AgentReply>;
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    endpoint: String,
}

impl AgentClient {
    /// The backend blocks while it records, so no request timeout is set.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Host and port of the endpoint, for display ("127.0.0.1:8000")
    pub fn host_label(&self) -> String {
        reqwest::Url::parse(&self.endpoint)
            .ok()
            .and_then(|url| {
                let host = url.host_str()?.to_string();
                Some(match url.port_or_known_default() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host,
                })
            })
            .unwrap_or_else(|| self.endpoint.clone())
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl AgentBackend for AgentClient {
    async fn run_agent(&self) -> AgentResult<AgentReply> {
        debug!(endpoint = %self.endpoint, "requesting agent turn");

        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(AgentError::Status(response.status()));
        }

        // Decode separately so a bad body is reported as a decode failure,
        // not a transport one.
        let body = response.text().await?;
        let reply: AgentReply = serde_json::from_str(&body)?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_missing_fields_are_none() {
        let reply: AgentReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply, AgentReply::default());
    }

    #[test]
    fn test_reply_null_fields_are_none() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"user_text": null, "bot_text": "ok"}"#).unwrap();
        assert_eq!(reply.user_text, None);
        assert_eq!(reply.bot_text.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reply_ignores_unknown_keys() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"user_text": "hi", "latency_ms": 5012}"#).unwrap();
        assert_eq!(reply, AgentReply::new(Some("hi"), None));
    }

    #[test]
    fn test_reply_rejects_non_object() {
        assert!(serde_json::from_str::<AgentReply>(r#""hello""#).is_err());
        assert!(serde_json::from_str::<AgentReply>("<html>Internal Server Error</html>").is_err());
    }

    #[test]
    fn test_default_client_targets_local_backend() {
        assert_eq!(AgentClient::default().endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(AgentClient::new("http://10.0.0.5:9000/run-agent").endpoint(), "http://10.0.0.5:9000/run-agent");
    }

    #[test]
    fn test_host_label() {
        assert_eq!(AgentClient::default().host_label(), "127.0.0.1:8000");
        assert_eq!(
            AgentClient::new("http://localhost/run-agent").host_label(),
            "localhost:80"
        );
        assert_eq!(AgentClient::new("not a url").host_label(), "not a url");
    }
}
