use serde::Serialize;
use thiserror::Error;

/// Why a configuration value could not be turned into a [`ProjectSpec`].
///
/// Only `TooFewParts` comes from the `projectID,topic[:sub]*` grammar itself.
/// The `Empty*` variants are stricter than the grammar: an empty identifier
/// (`,t1`, `demo,t1,`, `demo,t1::s`) is rejected here instead of being passed
/// to the backend and failing there.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("too few parts: expected a project id and at least 1 topic")]
    TooFewParts,
    #[error("empty project id")]
    EmptyProjectId,
    #[error("empty topic name at position {position}")]
    EmptyTopic { position: usize },
    #[error("empty subscription name on topic {topic:?}")]
    EmptySubscription { topic: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSpec {
    pub name: String,
    pub subscriptions: Vec<String>,
}

/// Topics of one project with their subscriptions, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Topology {
    topics: Vec<TopicSpec>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic. A topic that is already present has its subscriptions
    /// replaced but keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, subscriptions: Vec<String>) {
        let name = name.into();
        match self.topics.iter_mut().find(|topic| topic.name == name) {
            Some(existing) => existing.subscriptions = subscriptions,
            None => self.topics.push(TopicSpec { name, subscriptions }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.topics
            .iter()
            .find(|topic| topic.name == name)
            .map(|topic| topic.subscriptions.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicSpec> {
        self.topics.iter()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.subscriptions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSpec {
    pub project_id: String,
    pub topology: Topology,
}

/// Parses `projectID,topic1:sub1:sub2,topic2`.
///
/// All whitespace is removed before splitting, so identifiers cannot contain
/// spaces.
pub fn parse(raw: &str) -> Result<ProjectSpec, ParseError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let mut parts = cleaned.split(',');
    let project_id = parts.next().unwrap_or_default();
    let topic_defs: Vec<&str> = parts.collect();
    if topic_defs.is_empty() {
        return Err(ParseError::TooFewParts);
    }
    if project_id.is_empty() {
        return Err(ParseError::EmptyProjectId);
    }

    let mut topology = Topology::new();
    for (index, def) in topic_defs.into_iter().enumerate() {
        let mut pieces = def.split(':');
        let topic = pieces.next().unwrap_or_default();
        if topic.is_empty() {
            return Err(ParseError::EmptyTopic { position: index + 1 });
        }
        let subscriptions = pieces
            .map(|sub| {
                if sub.is_empty() {
                    Err(ParseError::EmptySubscription { topic: topic.to_string() })
                } else {
                    Ok(sub.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        topology.insert(topic, subscriptions);
    }

    Ok(ProjectSpec {
        project_id: project_id.to_string(),
        topology,
    })
}
