use serde::Serialize;

use crate::{
    backend::Backend,
    config::{BackendSettings, Settings},
    discovery::EnvironmentMapping,
    emulator::EmulatorBackend,
    memory::MemoryBackend,
    provision::{provision, ProvisionSummary},
    topology::parse,
};

pub mod backend;
pub mod config;
pub mod discovery;
pub mod emulator;
pub mod error;
pub mod memory;
pub mod provision;
pub mod topology;

pub use error::Error;

pub struct PubSubForge {
    settings: Settings,
    backend: Box<dyn Backend>,
}

impl PubSubForge {
    /// Builds the backend described by `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        let backend: Box<dyn Backend> = match &settings.backend {
            BackendSettings::Emulator { host, request_timeout } => {
                Box::new(EmulatorBackend::new(host.clone()).with_request_timeout(*request_timeout))
            }
            BackendSettings::DryRun => Box::new(MemoryBackend::new()),
        };
        PubSubForge { settings, backend }
    }

    pub fn with_backend(settings: Settings, backend: impl Backend + 'static) -> Self {
        PubSubForge {
            settings,
            backend: Box::new(backend),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reads the projects matching the configured pattern from the process environment.
    pub fn discover(&self) -> EnvironmentMapping {
        discovery::discover(&self.settings.pattern)
    }

    /// Provisions every project in `projects`, one after the other.
    ///
    /// Each project gets an entry in the report. With `stop_on_error` the
    /// projects after the first failure are skipped instead of attempted.
    pub async fn run(&self, projects: &EnvironmentMapping) -> Result<RunReport, Error> {
        if projects.is_empty() {
            return Err(Error::NoConfiguration {
                pattern: self.settings.pattern.clone(),
            });
        }

        let mut report = RunReport::default();
        for (variable, raw) in projects {
            if self.settings.stop_on_error && !report.is_success() {
                tracing::debug!("Skipping {} after earlier failure", variable);
                report.projects.push(ProjectReport {
                    variable: variable.clone(),
                    project_id: None,
                    outcome: ProjectOutcome::Skipped,
                });
                continue;
            }

            tracing::info!("Creating project {}", variable);
            let (project_id, result) = match parse(raw) {
                Ok(spec) => {
                    let result = provision(self.backend.as_ref(), &spec).await;
                    (Some(spec.project_id), result)
                }
                Err(source) => (
                    None,
                    Err(Error::Parse {
                        variable: variable.clone(),
                        source,
                    }),
                ),
            };

            let outcome = match result {
                Ok(summary) => {
                    tracing::info!(
                        "Project {:?} ready: {} topics, {} subscriptions",
                        project_id.as_deref().unwrap_or_default(),
                        summary.topics,
                        summary.subscriptions
                    );
                    ProjectOutcome::Provisioned(summary)
                }
                Err(err) => {
                    tracing::error!("{}", err);
                    ProjectOutcome::Failed(err)
                }
            };
            report.projects.push(ProjectReport {
                variable: variable.clone(),
                project_id,
                outcome,
            });
        }

        Ok(report)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum ProjectOutcome {
    Provisioned(ProvisionSummary),
    Failed(#[serde(serialize_with = "serialize_error")] Error),
    Skipped,
}

impl ProjectOutcome {
    pub fn error(&self) -> Option<&Error> {
        match self {
            ProjectOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ProjectOutcome::Skipped)
    }
}

/// Errors appear in the JSON report as their one-line message.
fn serialize_error<S: serde::Serializer>(err: &Error, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub variable: String,
    pub project_id: Option<String>,
    pub outcome: ProjectOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub projects: Vec<ProjectReport>,
}

impl RunReport {
    /// True when no project failed. Skipped projects only follow a failure.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ProjectReport, &Error)> {
        self.projects
            .iter()
            .filter_map(|project| project.outcome.error().map(|err| (project, err)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ProjectReport> {
        self.projects
            .iter()
            .filter(|project| project.outcome.is_skipped())
    }
}
