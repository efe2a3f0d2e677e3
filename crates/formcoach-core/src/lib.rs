//! Formcoach core: repetition counting and form feedback from pose landmarks.
//!
//! A pose model reports one [`LandmarkFrame`] per video frame. A
//! [`Session`] runs each frame through a [`RepDetector`] configured for one
//! exercise and returns a [`FeedbackResponse`] with coaching messages, the
//! repetition count and the completion of the current movement.
//!
//! Exercises are data: a [`DetectorRegistry`] is built from a
//! [`FormcoachConfig`] (built-in presets plus optional TOML layers) and
//! hands out independent sessions, one per stream.

pub mod angle;
pub mod config;
pub mod detector;
pub mod error;
pub mod feedback;
pub mod landmarks;
pub mod metric;
pub mod presets;
pub mod registry;
pub mod session;
pub mod synthetic;

pub use angle::{angle_between, joint_angle, remap};
pub use config::{
    AccessorConfig, ConfigError, ExerciseConfig, ExerciseKind, FormcoachConfig, Phase,
    PhaseConfig, ProgressConfig,
};
pub use detector::{
    DetectorOutput, ExerciseState, FrameStatus, RepDetector, SkipReason, TrackingState,
};
pub use error::SessionError;
pub use feedback::{aggregate, FeedbackResponse};
pub use landmarks::{Joint, Landmark, LandmarkAccessor, LandmarkFrame, Point};
pub use metric::{Check, Metric};
pub use registry::DetectorRegistry;
pub use session::{IssueRecord, Session, SessionSummary};

#[cfg(test)]
mod tests_config;
#[cfg(test)]
mod tests_proptest;
