use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ValidationError};

use super::parse_duration_value;

/// A suite file as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub cooldown: Option<DurationValue>,
    #[serde(default)]
    pub runs: Vec<SuiteRunConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteRunConfig {
    pub duration: DurationValue,
    pub connections: usize,
}

/// `30` (seconds) or `"30s"` / `"500ms"` / `"2m"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}

/// A validated suite, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitePlan {
    pub name: String,
    pub url: String,
    pub container: Option<String>,
    /// Zero when no cooldown is configured.
    pub cooldown: Duration,
    pub runs: Vec<PlannedRun>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRun {
    pub duration: Duration,
    pub connections: NonZeroUsize,
}

impl PlannedRun {
    /// `run_<n>_<c>c_<secs>s.json`, numbered from 1.
    #[must_use]
    pub fn file_name(&self, number: usize) -> String {
        format!(
            "run_{}_{}c_{:.0}s.json",
            number,
            self.connections,
            self.duration.as_secs_f64()
        )
    }
}

impl SuiteConfig {
    /// # Errors
    ///
    /// Returns the first problem found; runs are numbered from 1.
    pub fn validate(&self) -> Result<SuitePlan, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptySuiteName);
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptySuiteUrl);
        }
        let cooldown = match self.cooldown.as_ref().map(DurationValue::to_duration) {
            None | Some(Err(ValidationError::DurationZero)) => Duration::ZERO,
            Some(Ok(cooldown)) => cooldown,
            Some(Err(err)) => return Err(ConfigError::InvalidCooldown { source: err }),
        };
        if self.runs.is_empty() {
            return Err(ConfigError::NoRuns);
        }

        let mut runs = Vec::with_capacity(self.runs.len());
        for (offset, run) in self.runs.iter().enumerate() {
            let index = offset.saturating_add(1);
            let connections = NonZeroUsize::new(run.connections)
                .ok_or(ConfigError::InvalidRunConnections { index })?;
            let duration = run
                .duration
                .to_duration()
                .map_err(|err| ConfigError::InvalidRunDuration { index, source: err })?;
            runs.push(PlannedRun {
                duration,
                connections,
            });
        }

        Ok(SuitePlan {
            name: self.name.trim().to_owned(),
            url: self.url.trim().to_owned(),
            container: self
                .container
                .as_ref()
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
            cooldown,
            runs,
        })
    }
}
