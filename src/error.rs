use thiserror::Error;

use crate::backend::BackendError;
use crate::topology::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected at least 1 {pattern} env param")]
    NoConfiguration { pattern: String },

    #[error("invalid configuration in {variable}: {source}")]
    Parse {
        variable: String,
        #[source]
        source: ParseError,
    },

    #[error("unable to create client to project {project:?}: {source}")]
    Connection {
        project: String,
        #[source]
        source: BackendError,
    },

    #[error("unable to create topic {topic:?} for project {project:?}: {source}")]
    TopicCreate {
        project: String,
        topic: String,
        #[source]
        source: BackendError,
    },

    #[error("unable to create subscription {subscription:?} on topic {topic:?} for project {project:?}: {source}")]
    SubscriptionCreate {
        project: String,
        topic: String,
        subscription: String,
        #[source]
        source: BackendError,
    },
}

impl Error {
    /// True for the configuration class: nothing discovered or unparsable value.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::NoConfiguration { .. } | Error::Parse { .. })
    }
}
