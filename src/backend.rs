use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
}

/// A created topic, identified by its fully qualified resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub topic: String,
}

/// A messaging service able to open project scoped sessions.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn open_session(&self, project_id: &str) -> Result<Box<dyn Session>, BackendError>;
}

/// A client session bound to a single project.
#[async_trait]
pub trait Session: Send + Sync {
    async fn create_topic(&self, topic_id: &str) -> Result<Topic, BackendError>;

    async fn create_subscription(
        &self,
        subscription_id: &str,
        topic: &Topic,
    ) -> Result<Subscription, BackendError>;

    async fn close(&self) -> Result<(), BackendError>;
}

pub fn topic_name(project_id: &str, topic_id: &str) -> String {
    format!("projects/{}/topics/{}", project_id, topic_id)
}

pub fn subscription_name(project_id: &str, subscription_id: &str) -> String {
    format!("projects/{}/subscriptions/{}", project_id, subscription_id)
}
