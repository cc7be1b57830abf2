use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::backend::{subscription_name, topic_name, Backend, BackendError, Session, Subscription, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionOpened { project: String },
    TopicCreated { project: String, topic: String },
    SubscriptionCreated { project: String, topic: String, subscription: String },
    SessionClosed { project: String },
}

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    topics: HashSet<String>,
    subscriptions: HashSet<String>,
    failing_sessions: HashSet<String>,
    failing_topics: HashSet<String>,
    failing_subscriptions: HashSet<String>,
}

/// In-process backend that records every call. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `open_session` fail for `project`.
    pub fn fail_session(&self, project: &str) {
        self.lock().failing_sessions.insert(project.to_string());
    }

    /// Makes creation of topic `topic` fail in every project.
    pub fn fail_topic(&self, topic: &str) {
        self.lock().failing_topics.insert(topic.to_string());
    }

    pub fn fail_subscription(&self, subscription: &str) {
        self.lock().failing_subscriptions.insert(subscription.to_string());
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Fully qualified names of created topics, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<_> = self.lock().topics.iter().cloned().collect();
        topics.sort();
        topics
    }

    pub fn subscriptions(&self) -> Vec<String> {
        let mut subscriptions: Vec<_> = self.lock().subscriptions.iter().cloned().collect();
        subscriptions.sort();
        subscriptions
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn open_session(&self, project_id: &str) -> Result<Box<dyn Session>, BackendError> {
        let mut state = self.lock();
        if state.failing_sessions.contains(project_id) {
            return Err(BackendError::Rejected(format!("cannot open session for {}", project_id)));
        }
        state.events.push(Event::SessionOpened {
            project: project_id.to_string(),
        });
        Ok(Box::new(MemorySession {
            project: project_id.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    project: String,
    state: Arc<Mutex<State>>,
}

impl MemorySession {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn create_topic(&self, topic_id: &str) -> Result<Topic, BackendError> {
        let name = topic_name(&self.project, topic_id);
        let mut state = self.lock();
        if state.failing_topics.contains(topic_id) {
            return Err(BackendError::Rejected(format!("injected failure for {}", name)));
        }
        if !state.topics.insert(name.clone()) {
            return Err(BackendError::AlreadyExists(name));
        }
        state.events.push(Event::TopicCreated {
            project: self.project.clone(),
            topic: topic_id.to_string(),
        });
        Ok(Topic {
            id: topic_id.to_string(),
            name,
        })
    }

    async fn create_subscription(
        &self,
        subscription_id: &str,
        topic: &Topic,
    ) -> Result<Subscription, BackendError> {
        let name = subscription_name(&self.project, subscription_id);
        let mut state = self.lock();
        if state.failing_subscriptions.contains(subscription_id) {
            return Err(BackendError::Rejected(format!("injected failure for {}", name)));
        }
        if !state.topics.contains(&topic.name) {
            return Err(BackendError::NotFound(topic.name.clone()));
        }
        if !state.subscriptions.insert(name.clone()) {
            return Err(BackendError::AlreadyExists(name));
        }
        state.events.push(Event::SubscriptionCreated {
            project: self.project.clone(),
            topic: topic.id.clone(),
            subscription: subscription_id.to_string(),
        });
        Ok(Subscription {
            id: subscription_id.to_string(),
            name,
            topic: topic.name.clone(),
        })
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.lock().events.push(Event::SessionClosed {
            project: self.project.clone(),
        });
        Ok(())
    }
}
