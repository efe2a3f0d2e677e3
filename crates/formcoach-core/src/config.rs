use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::landmarks::Joint;
use crate::metric::{Check, Metric};
use crate::presets;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Exercise family a configuration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Deadlift,
    BicepCurl,
    Squat,
    Lunge,
    Plank,
}

impl ExerciseKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deadlift => "deadlift",
            Self::BicepCurl => "bicep_curl",
            Self::Squat => "squat",
            Self::Lunge => "lunge",
            Self::Plank => "plank",
        }
    }
}

/// One end of the completion range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Completion at 0%
    Empty,
    /// Completion at 100%
    Full,
}

/// Landmark resolution settings shared by every exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessorConfig {
    /// Landmarks below this visibility are treated as missing
    pub min_visibility: f32,
    /// Pixel space that normalized coordinates are projected into
    pub frame_width: f32,
    pub frame_height: f32,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            frame_width: 640.0,
            frame_height: 480.0,
        }
    }
}

/// Primary angle that drives repetition progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub metric: Metric,
    /// Angle mapped to 0% completion
    pub empty_angle: f32,
    /// Angle mapped to 100% completion
    pub full_angle: f32,
}

/// Progress-bar pixel range (presentation only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarConfig {
    pub empty_px: f32,
    pub full_px: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            empty_px: 380.0,
            full_px: 50.0,
        }
    }
}

/// Behaviour when completion reaches one end of the range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Feedback once the phase is reached with `requires` satisfied
    pub feedback: String,
    #[serde(default)]
    pub requires: Vec<Check>,
    /// Feedback when the phase is reached but `requires` fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<String>,
}

impl PhaseConfig {
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            requires: Vec::new(),
            otherwise: None,
        }
    }
}

fn default_tolerance() -> f32 {
    1.0
}

fn default_gate_frames() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Declarative description of one exercise detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub kind: ExerciseKind,
    /// Feedback before the first frame is evaluated
    pub initial_feedback: String,
    /// Phase the athlete starts in; the first half-repetition is
    /// counted on reaching the opposite one
    pub start_phase: Phase,
    /// Percentage points from either end that still count as reaching it
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    /// Consecutive qualifying frames required to open the form gate
    #[serde(default = "default_gate_frames")]
    pub gate_frames: u32,
    /// Static holds report phase feedback and hold time only
    #[serde(default = "default_true")]
    pub count_repetitions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar: Option<BarConfig>,
    pub progress: ProgressConfig,
    /// Form precondition
    #[serde(default)]
    pub gate: Vec<Check>,
    /// Secondary constraints while tracking
    #[serde(default)]
    pub checks: Vec<Check>,
    pub empty: PhaseConfig,
    pub full: PhaseConfig,
}

impl ExerciseConfig {
    pub fn phase(&self, phase: Phase) -> &PhaseConfig {
        match phase {
            Phase::Empty => &self.empty,
            Phase::Full => &self.full,
        }
    }

    /// Every joint the detector reads, deduplicated
    pub fn joints(&self) -> Vec<Joint> {
        let mut joints: Vec<Joint> = self.progress.metric.joints();
        let checks = self
            .gate
            .iter()
            .chain(self.checks.iter())
            .chain(self.empty.requires.iter())
            .chain(self.full.requires.iter());
        for check in checks {
            joints.extend(check.metric.joints());
        }
        joints.sort();
        joints.dedup();
        joints
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let progress = &self.progress;
        if !progress.empty_angle.is_finite() || !progress.full_angle.is_finite() {
            return Err(ConfigError::Validation(format!(
                "exercises.{name}.progress angles must be finite"
            )));
        }
        if (progress.empty_angle - progress.full_angle).abs() < f32::EPSILON {
            return Err(ConfigError::Validation(format!(
                "exercises.{name}.progress.empty_angle must differ from full_angle"
            )));
        }
        if !(0.0..50.0).contains(&self.tolerance) {
            return Err(ConfigError::Validation(format!(
                "exercises.{name}.tolerance must be in [0, 50)"
            )));
        }
        if self.gate_frames == 0 {
            return Err(ConfigError::Validation(format!(
                "exercises.{name}.gate_frames must be >= 1"
            )));
        }

        let checks = self
            .gate
            .iter()
            .chain(self.checks.iter())
            .chain(self.empty.requires.iter())
            .chain(self.full.requires.iter());
        for check in checks {
            match (check.min, check.max) {
                (None, None) => {
                    return Err(ConfigError::Validation(format!(
                        "exercises.{name}: every check needs min or max"
                    )));
                }
                (Some(min), Some(max)) if min >= max => {
                    return Err(ConfigError::Validation(format!(
                        "exercises.{name}: check min {min} must be below max {max}"
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormcoachConfig {
    #[serde(default)]
    pub landmarks: AccessorConfig,
    /// Keyed by the exercise selector a session is started with
    #[serde(default)]
    pub exercises: BTreeMap<String, ExerciseConfig>,
}

impl Default for FormcoachConfig {
    fn default() -> Self {
        Self {
            landmarks: AccessorConfig::default(),
            exercises: presets::default_exercises(),
        }
    }
}

impl FormcoachConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: FormcoachConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, then apply `FORMCOACH_MIN_VISIBILITY`,
    /// `FORMCOACH_FRAME_WIDTH` and `FORMCOACH_FRAME_HEIGHT` on top of its
    /// `[landmarks]` table. Exercises are not affected by the environment.
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Start from the built-in presets and merge each file that exists,
    /// `default_path` first and `user_path` last, then apply the
    /// `FORMCOACH_*` landmark overrides.
    ///
    /// Exercises merge by name. Each merged file replaces `[landmarks]` as
    /// a whole, so a file without the table resets it to the defaults.
    /// Missing files are skipped.
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = FormcoachConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = config.merge(Self::from_file(path)?);
            }
        }

        if let Some(path) = user_path {
            if path.exists() {
                config = config.merge(Self::from_file(path)?);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Accessor settings come from `other`; its exercises replace
    /// same-named entries and add new ones.
    pub fn merge(mut self, other: FormcoachConfig) -> Self {
        self.landmarks = other.landmarks;
        for (name, exercise) in other.exercises {
            if self.exercises.contains_key(&name) {
                log::info!("exercise '{}' overridden by config layer", name);
            }
            self.exercises.insert(name, exercise);
        }
        self
    }

    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env;

        if let Ok(val) = env::var("FORMCOACH_MIN_VISIBILITY") {
            self.landmarks.min_visibility = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid FORMCOACH_MIN_VISIBILITY".to_string())
            })?;
        }
        if let Ok(val) = env::var("FORMCOACH_FRAME_WIDTH") {
            self.landmarks.frame_width = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid FORMCOACH_FRAME_WIDTH".to_string())
            })?;
        }
        if let Ok(val) = env::var("FORMCOACH_FRAME_HEIGHT") {
            self.landmarks.frame_height = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid FORMCOACH_FRAME_HEIGHT".to_string())
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let landmarks = &self.landmarks;
        if !(0.0..=1.0).contains(&landmarks.min_visibility) {
            return Err(ConfigError::Validation(
                "landmarks.min_visibility must be in [0, 1]".to_string(),
            ));
        }
        if !(landmarks.frame_width > 0.0) || !(landmarks.frame_height > 0.0) {
            return Err(ConfigError::Validation(
                "landmarks.frame_width and frame_height must be positive".to_string(),
            ));
        }

        for (name, exercise) in &self.exercises {
            exercise.validate(name)?;
        }

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
