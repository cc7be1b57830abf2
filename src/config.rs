use std::time::Duration;

pub const DEFAULT_PATTERN: &str = "PUBSUB_PROJECT_*";
pub const EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Run settings, built once at startup and handed to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub pattern: String,
    pub stop_on_error: bool,
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSettings {
    Emulator {
        host: String,
        request_timeout: Option<Duration>,
    },
    DryRun,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Settings {
    pub fn emulator(host: impl Into<String>) -> Self {
        Settings {
            pattern: default_pattern(),
            stop_on_error: false,
            backend: BackendSettings::Emulator {
                host: host.into(),
                request_timeout: None,
            },
        }
    }

    pub fn dry_run() -> Self {
        Settings {
            pattern: default_pattern(),
            stop_on_error: false,
            backend: BackendSettings::DryRun,
        }
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}
