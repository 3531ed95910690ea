/// Run configuration.
///
/// Settings come from an optional TOML file, then command-line flags
/// override individual values. Everything has a default, so an empty file
/// (or no file at all) runs the `by_city` profile into `./pie_charts`.
///
/// ```toml
/// profile = "by_magnitude"
/// output_dir = "pie_charts"
/// format = "svg"          # or "json"
/// on_error = "skip"       # or "abort" (default)
/// log_level = "info"
/// log_file = "quakecharts.log"
///
/// # Optional: replace the profile's bucket boundaries.
/// [scheme]
/// magnitude = [{ label = "small", up_to = 3.0 }, { label = "large", above = 3.0 }]
/// # ...
/// ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::ReportPlan;
use crate::classify::thresholds::ClassScheme;
use crate::logging::LogLevel;
use crate::model::QuakeError;
use crate::profiles::Profile;
use crate::render::OutputFormat;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "QUAKECHARTS_CONFIG";

pub const DEFAULT_OUTPUT_DIR: &str = "pie_charts";

/// What to do with a record that cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the run before any chart is written.
    #[default]
    Abort,
    /// Log the record and leave it out of every table.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub profile: Profile,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub on_error: ErrorPolicy,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    /// Replaces the profile's bucket boundaries when present.
    pub scheme: Option<ClassScheme>,
    /// Replaces the profile's chart list when present.
    pub plan: Option<ReportPlan>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile: Profile::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            on_error: ErrorPolicy::default(),
            log_level: LogLevel::default(),
            log_file: None,
            scheme: None,
            plan: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, QuakeError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, QuakeError> {
        let text = fs::read_to_string(path).map_err(|e| {
            QuakeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, QuakeError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// The bucket scheme in effect, validated.
    pub fn scheme(&self) -> Result<ClassScheme, QuakeError> {
        let scheme = self.scheme.clone().unwrap_or_else(|| self.profile.scheme());
        scheme.validate()?;
        Ok(scheme)
    }

    /// The chart plan in effect.
    pub fn plan(&self) -> ReportPlan {
        self.plan.clone().unwrap_or_else(|| self.profile.plan())
    }
}
