//! Detector Registry
//!
//! Populated once at startup from a [`FormcoachConfig`] and immutable
//! afterwards. Sessions are created through it, so the set of supported
//! exercises is injected rather than looked up from global state. The
//! registry is `Send + Sync` and can be shared behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{AccessorConfig, ConfigError, ExerciseConfig, FormcoachConfig};
use crate::detector::RepDetector;
use crate::error::SessionError;
use crate::landmarks::LandmarkAccessor;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    accessor: AccessorConfig,
    exercises: BTreeMap<String, Arc<ExerciseConfig>>,
}

impl DetectorRegistry {
    /// Registry holding the built-in presets
    pub fn new() -> Self {
        Self::build(FormcoachConfig::default())
    }

    /// Validate `config` and register every exercise it names
    pub fn from_config(config: FormcoachConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: FormcoachConfig) -> Self {
        let exercises: BTreeMap<String, Arc<ExerciseConfig>> = config
            .exercises
            .into_iter()
            .map(|(name, exercise)| (name, Arc::new(exercise)))
            .collect();
        log::info!(
            "registered {} exercises: {}",
            exercises.len(),
            exercises.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        Self {
            accessor: config.landmarks,
            exercises,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exercises.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ExerciseConfig> {
        self.exercises.get(name).map(|e| e.as_ref())
    }

    pub fn accessor(&self) -> LandmarkAccessor {
        LandmarkAccessor::with_config(&self.accessor)
    }

    /// Fresh detector for the exercise selected by `name`
    pub fn create_detector(&self, name: &str) -> Result<RepDetector, SessionError> {
        let config = self
            .exercises
            .get(name)
            .ok_or_else(|| SessionError::UnsupportedExercise {
                name: name.to_string(),
                available: self.exercises.keys().cloned().collect(),
            })?;

        Ok(RepDetector::new(name, Arc::clone(config), self.accessor()))
    }

    /// Start a session; one session per stream
    pub fn start_session(&self, name: &str) -> Result<Session, SessionError> {
        let detector = self.create_detector(name)?;
        log::info!("session started for '{}'", name);
        Ok(Session::new(detector))
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
