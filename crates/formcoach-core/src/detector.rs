//! Repetition Detector
//!
//! One generic state machine drives every exercise; the exercise itself is
//! described by an [`ExerciseConfig`]. Per frame:
//! 1. Resolve every joint the exercise reads (skip the frame otherwise)
//! 2. Map the primary angle onto a completion percentage
//! 3. While awaiting form, evaluate the form gate
//! 4. While tracking, evaluate secondary checks, then phase boundaries
//!
//! A frame that cannot be evaluated leaves count, phase and feedback
//! untouched. Hold time only accrues between consecutive frames that were
//! tracked with every check passing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::angle::remap;
use crate::config::{ExerciseConfig, ExerciseKind, Phase};
use crate::landmarks::{Joint, LandmarkAccessor, LandmarkFrame};
use crate::metric::evaluate_checks;

/// Whether counting is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// Form precondition not yet met
    AwaitingForm,
    Tracking,
}

/// Why a frame was not evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The pose model reported no landmarks
    NoPose,
    /// Required joints absent or below the visibility threshold
    MissingLandmarks(Vec<Joint>),
    /// The primary angle could not be measured
    UndefinedProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Evaluated,
    Skipped(SkipReason),
}

impl FrameStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, FrameStatus::Skipped(_))
    }
}

/// Mutable state owned by one detector
#[derive(Debug, Clone)]
pub struct ExerciseState {
    pub tracking: TrackingState,
    /// Repetitions counted in half steps
    pub half_reps: u32,
    /// Last completed phase
    pub direction: Phase,
    /// Consecutive frames that satisfied the form gate
    pub gate_streak: u32,
    pub feedback: Vec<String>,
    /// Completion percentage of the last evaluated frame
    pub completion: f32,
    /// Time spent tracking with every check passing
    pub hold_us: i64,
    /// Timestamp of the previous frame that was tracked with every check
    /// passing; cleared by any other frame
    pub last_good_us: Option<i64>,
}

impl ExerciseState {
    pub fn new(config: &ExerciseConfig) -> Self {
        Self {
            tracking: TrackingState::AwaitingForm,
            half_reps: 0,
            direction: config.start_phase,
            gate_streak: 0,
            feedback: vec![config.initial_feedback.clone()],
            completion: match config.start_phase {
                Phase::Empty => 0.0,
                Phase::Full => 100.0,
            },
            hold_us: 0,
            last_good_us: None,
        }
    }

    pub fn repetition_count(&self) -> f32 {
        self.half_reps as f32 / 2.0
    }

    pub fn form_ok(&self) -> bool {
        self.tracking == TrackingState::Tracking
    }

    pub fn feedback_text(&self) -> String {
        self.feedback.join(" ")
    }
}

/// Result of processing one frame
#[derive(Debug, Clone)]
pub struct DetectorOutput {
    pub timestamp_us: i64,
    pub status: FrameStatus,
    pub tracking: TrackingState,
    /// Phase boundary the frame sits on, if any
    pub phase: Option<Phase>,
    /// A half-repetition was added on this frame
    pub counted: bool,
    pub feedback: Vec<String>,
    /// Form problems found on this frame
    pub issues: Vec<String>,
    pub repetition_count: f32,
    pub completion: f32,
    pub bar_position: Option<f32>,
    pub hold_seconds: f32,
}

/// Generic repetition state machine for one session
#[derive(Debug, Clone)]
pub struct RepDetector {
    name: String,
    config: Arc<ExerciseConfig>,
    accessor: LandmarkAccessor,
    required: Vec<Joint>,
    state: ExerciseState,
}

impl RepDetector {
    pub fn new(
        name: impl Into<String>,
        config: Arc<ExerciseConfig>,
        accessor: LandmarkAccessor,
    ) -> Self {
        let required = config.joints();
        let state = ExerciseState::new(&config);
        Self {
            name: name.into(),
            config,
            accessor,
            required,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ExerciseKind {
        self.config.kind
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = ExerciseState::new(&self.config);
    }

    /// Process one frame. Frames must arrive in capture order.
    pub fn update(&mut self, frame: &LandmarkFrame) -> DetectorOutput {
        if frame.is_empty() {
            return self.skip(frame, SkipReason::NoPose);
        }

        let missing = self.accessor.missing(frame, self.required.iter().copied());
        if !missing.is_empty() {
            return self.skip(frame, SkipReason::MissingLandmarks(missing));
        }

        let progress = &self.config.progress;
        let angle = match progress.metric.evaluate(&self.accessor, frame) {
            Some(angle) => angle,
            None => return self.skip(frame, SkipReason::UndefinedProgress),
        };

        let completion = remap(
            angle,
            (progress.empty_angle, progress.full_angle),
            (0.0, 100.0),
        );
        self.state.completion = completion;
        log::trace!("{}: angle {:.1}, completion {:.1}%", self.name, angle, completion);

        if !self.state.form_ok() {
            self.state.last_good_us = None;
            let (opened, failures) = self.evaluate_gate(frame);
            if !opened {
                return self.output(frame, FrameStatus::Evaluated, None, false, failures);
            }
        }

        let (checks_ok, failures) = evaluate_checks(&self.config.checks, &self.accessor, frame);
        if !checks_ok {
            self.state.last_good_us = None;
            if !failures.is_empty() {
                self.state.feedback = failures.clone();
            }
            return self.output(frame, FrameStatus::Evaluated, None, false, failures);
        }

        if let Some(last) = self.state.last_good_us {
            self.state.hold_us = self
                .state
                .hold_us
                .saturating_add(frame.timestamp_us.saturating_sub(last).max(0));
        }
        self.state.last_good_us = Some(frame.timestamp_us);

        let phase = self.phase_for(completion);
        let mut counted = false;
        let mut issues = Vec::new();

        if let Some(phase) = phase {
            let phase_config = self.config.phase(phase);
            let (reached, _) = evaluate_checks(&phase_config.requires, &self.accessor, frame);
            if reached {
                self.state.feedback = vec![phase_config.feedback.clone()];
                if self.state.direction != phase {
                    self.state.direction = phase;
                    if self.config.count_repetitions {
                        self.state.half_reps += 1;
                        counted = true;
                        log::info!(
                            "{}: {:?} reached, count {}",
                            self.name,
                            phase,
                            self.state.repetition_count()
                        );
                    }
                }
            } else if let Some(otherwise) = &phase_config.otherwise {
                self.state.feedback = vec![otherwise.clone()];
                issues.push(otherwise.clone());
            }
        }

        self.output(frame, FrameStatus::Evaluated, phase, counted, issues)
    }

    /// Whether the gate has opened, and the messages of failing gate checks
    fn evaluate_gate(&mut self, frame: &LandmarkFrame) -> (bool, Vec<String>) {
        let (passed, failures) = evaluate_checks(&self.config.gate, &self.accessor, frame);
        if !failures.is_empty() {
            self.state.feedback = failures.clone();
        }

        if passed {
            self.state.gate_streak += 1;
        } else {
            self.state.gate_streak = 0;
        }

        if self.state.gate_streak >= self.config.gate_frames {
            self.state.tracking = TrackingState::Tracking;
            log::info!("{}: form gate open, tracking", self.name);
            (true, failures)
        } else {
            (false, failures)
        }
    }

    fn phase_for(&self, completion: f32) -> Option<Phase> {
        let tolerance = self.config.tolerance;
        if completion >= 100.0 - tolerance {
            Some(Phase::Full)
        } else if completion <= tolerance {
            Some(Phase::Empty)
        } else {
            None
        }
    }

    fn skip(&mut self, frame: &LandmarkFrame, reason: SkipReason) -> DetectorOutput {
        self.state.last_good_us = None;
        log::debug!("{}: frame {} skipped: {:?}", self.name, frame.timestamp_us, reason);
        self.output(frame, FrameStatus::Skipped(reason), None, false, Vec::new())
    }

    fn output(
        &self,
        frame: &LandmarkFrame,
        status: FrameStatus,
        phase: Option<Phase>,
        counted: bool,
        issues: Vec<String>,
    ) -> DetectorOutput {
        let completion = self.state.completion;
        let bar_position = self
            .config
            .bar
            .as_ref()
            .map(|bar| remap(completion, (0.0, 100.0), (bar.empty_px, bar.full_px)));

        DetectorOutput {
            timestamp_us: frame.timestamp_us,
            status,
            tracking: self.state.tracking,
            phase,
            counted,
            feedback: self.state.feedback.clone(),
            issues,
            repetition_count: self.state.repetition_count(),
            completion,
            bar_position,
            hold_seconds: self.state.hold_us as f32 / 1_000_000.0,
        }
    }
}
