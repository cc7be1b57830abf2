use serde::Serialize;

use crate::backend::{Backend, Session};
use crate::error::Error;
use crate::topology::ProjectSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    pub topics: usize,
    pub subscriptions: usize,
}

/// Creates every topic of `spec` followed by its subscriptions, stopping at
/// the first failure. The session is closed on every path once opened.
pub async fn provision(backend: &dyn Backend, spec: &ProjectSpec) -> Result<ProvisionSummary, Error> {
    let project = spec.project_id.as_str();
    let session = backend
        .open_session(project)
        .await
        .map_err(|source| Error::Connection {
            project: project.to_string(),
            source,
        })?;
    tracing::debug!("Client connected with project ID {:?}", project);

    let result = create_all(session.as_ref(), spec).await;

    if let Err(err) = session.close().await {
        tracing::warn!("Failed to close session for project {:?}: {}", project, err);
    }
    result
}

async fn create_all(session: &dyn Session, spec: &ProjectSpec) -> Result<ProvisionSummary, Error> {
    let project = spec.project_id.as_str();
    let mut summary = ProvisionSummary::default();

    for topic_spec in spec.topology.iter() {
        tracing::debug!("  Creating topic {:?}", topic_spec.name);
        let topic = session
            .create_topic(&topic_spec.name)
            .await
            .map_err(|source| Error::TopicCreate {
                project: project.to_string(),
                topic: topic_spec.name.clone(),
                source,
            })?;
        summary.topics += 1;

        for subscription in &topic_spec.subscriptions {
            tracing::debug!("    Creating subscription {:?}", subscription);
            session
                .create_subscription(subscription, &topic)
                .await
                .map_err(|source| Error::SubscriptionCreate {
                    project: project.to_string(),
                    topic: topic_spec.name.clone(),
                    subscription: subscription.clone(),
                    source,
                })?;
            summary.subscriptions += 1;
        }
    }

    Ok(summary)
}
