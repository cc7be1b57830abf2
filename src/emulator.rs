use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::backend::{subscription_name, topic_name, Backend, BackendError, Session, Subscription, Topic};

/// Client for the REST surface of the Pub/Sub emulator.
#[derive(Debug, Clone)]
pub struct EmulatorBackend {
    host: String,
    request_timeout: Option<Duration>,
}

impl EmulatorBackend {
    pub fn new(host: impl Into<String>) -> Self {
        EmulatorBackend {
            host: host.into(),
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Turns `localhost:8085` into `http://localhost:8085/`.
fn base_url(host: &str) -> Result<Url, BackendError> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(BackendError::InvalidEndpoint {
            endpoint: host.to_string(),
            reason: "empty host".to_string(),
        });
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|err| BackendError::InvalidEndpoint {
        endpoint: host.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(BackendError::InvalidEndpoint {
            endpoint: host.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

#[async_trait]
impl Backend for EmulatorBackend {
    async fn open_session(&self, project_id: &str) -> Result<Box<dyn Session>, BackendError> {
        let base = base_url(&self.host)?;
        let mut builder = Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Box::new(EmulatorSession {
            client,
            base,
            project: project_id.to_string(),
        }))
    }
}

struct EmulatorSession {
    client: Client,
    base: Url,
    project: String,
}

#[derive(Serialize)]
struct EmptyBody {}

#[derive(Serialize)]
struct SubscriptionBody<'a> {
    topic: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl EmulatorSession {
    /// `v1/projects/{project}/{collection}/{id}` with each segment escaped.
    fn resource_url(&self, collection: &str, id: &str) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidEndpoint {
                endpoint: self.base.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "projects", self.project.as_str(), collection, id]);
        Ok(url)
    }

    async fn put<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), BackendError> {
        tracing::trace!("PUT {}", url);
        let response = self.client.put(url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => envelope.error.message,
            Err(_) if text.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => text.trim().to_string(),
        };
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Session for EmulatorSession {
    async fn create_topic(&self, topic_id: &str) -> Result<Topic, BackendError> {
        let url = self.resource_url("topics", topic_id)?;
        self.put(url, &EmptyBody {}).await?;
        Ok(Topic {
            id: topic_id.to_string(),
            name: topic_name(&self.project, topic_id),
        })
    }

    async fn create_subscription(
        &self,
        subscription_id: &str,
        topic: &Topic,
    ) -> Result<Subscription, BackendError> {
        let url = self.resource_url("subscriptions", subscription_id)?;
        self.put(url, &SubscriptionBody { topic: &topic.name }).await?;
        Ok(Subscription {
            id: subscription_id.to_string(),
            name: subscription_name(&self.project, subscription_id),
            topic: topic.name.clone(),
        })
    }

    async fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_adds_scheme() {
        assert_eq!(base_url("localhost:8085").unwrap().as_str(), "http://localhost:8085/");
        assert_eq!(base_url(" 127.0.0.1:8681 ").unwrap().as_str(), "http://127.0.0.1:8681/");
        assert_eq!(base_url("https://pubsub.local").unwrap().as_str(), "https://pubsub.local/");
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(matches!(base_url(""), Err(BackendError::InvalidEndpoint { .. })));
        assert!(matches!(base_url("http://"), Err(BackendError::InvalidEndpoint { .. })));
        assert!(matches!(base_url("localhost:notaport"), Err(BackendError::InvalidEndpoint { .. })));
    }

    #[test]
    fn resource_urls_follow_rest_layout() {
        let session = EmulatorSession {
            client: Client::new(),
            base: base_url("localhost:8085").unwrap(),
            project: "demo".to_string(),
        };
        assert_eq!(
            session.resource_url("topics", "orders").unwrap().as_str(),
            "http://localhost:8085/v1/projects/demo/topics/orders"
        );
        assert_eq!(
            session.resource_url("subscriptions", "a/b").unwrap().as_str(),
            "http://localhost:8085/v1/projects/demo/subscriptions/a%2Fb"
        );
    }

    #[tokio::test]
    async fn open_session_with_invalid_host_fails() {
        let backend = EmulatorBackend::new("");
        assert!(backend.open_session("demo").await.is_err());
    }
}
