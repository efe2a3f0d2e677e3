//! Exercise Session
//!
//! Binds one detector to one stream. Frames are processed strictly in
//! order through `&mut self`, so a session has a single writer by
//! construction; concurrency comes from running many sessions.
//!
//! Besides the per-frame response, a session keeps the form issues seen
//! so far and can summarise the whole set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::ExerciseKind;
use crate::detector::{DetectorOutput, RepDetector};
use crate::feedback::{aggregate, FeedbackResponse};
use crate::landmarks::LandmarkFrame;

/// One kind of form problem observed during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub message: String,
    pub first_timestamp_us: i64,
    pub last_timestamp_us: i64,
    /// Separate episodes; consecutive frames with the same issue count once
    pub occurrences: u32,
}

/// End-of-session statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub exercise: String,
    pub kind: ExerciseKind,
    pub repetition_count: f32,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub hold_seconds: f32,
    pub issues: Vec<IssueRecord>,
}

#[derive(Debug)]
pub struct Session {
    detector: RepDetector,
    frames_processed: u64,
    frames_skipped: u64,
    issues: BTreeMap<String, IssueRecord>,
    /// Issues present on the previous evaluated frame
    active_issues: BTreeSet<String>,
    last_output: Option<DetectorOutput>,
}

impl Session {
    pub fn new(detector: RepDetector) -> Self {
        Self {
            detector,
            frames_processed: 0,
            frames_skipped: 0,
            issues: BTreeMap::new(),
            active_issues: BTreeSet::new(),
            last_output: None,
        }
    }

    pub fn exercise(&self) -> &str {
        self.detector.name()
    }

    pub fn detector(&self) -> &RepDetector {
        &self.detector
    }

    pub fn last_output(&self) -> Option<&DetectorOutput> {
        self.last_output.as_ref()
    }

    /// Run one frame through the detector and aggregate the result
    pub fn process(&mut self, frame: &LandmarkFrame) -> FeedbackResponse {
        let output = self.detector.update(frame);
        self.frames_processed += 1;

        if output.status.is_skipped() {
            self.frames_skipped += 1;
        } else {
            self.record_issues(&output);
        }

        let response = aggregate(&output);
        self.last_output = Some(output);
        response
    }

    fn record_issues(&mut self, output: &DetectorOutput) {
        let current: BTreeSet<String> = output.issues.iter().cloned().collect();

        for message in &current {
            let is_new_episode = !self.active_issues.contains(message);
            let record = self
                .issues
                .entry(message.clone())
                .or_insert_with(|| IssueRecord {
                    message: message.clone(),
                    first_timestamp_us: output.timestamp_us,
                    last_timestamp_us: output.timestamp_us,
                    occurrences: 0,
                });
            record.last_timestamp_us = output.timestamp_us;
            if is_new_episode {
                record.occurrences += 1;
            }
        }

        self.active_issues = current;
    }

    pub fn summary(&self) -> SessionSummary {
        let state = self.detector.state();
        let mut issues: Vec<IssueRecord> = self.issues.values().cloned().collect();
        issues.sort_by_key(|issue| issue.first_timestamp_us);

        SessionSummary {
            exercise: self.detector.name().to_string(),
            kind: self.detector.kind(),
            repetition_count: state.repetition_count(),
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            hold_seconds: state.hold_us as f32 / 1_000_000.0,
            issues,
        }
    }

    /// Clear detector state and collected results
    pub fn reset(&mut self) {
        self.detector.reset();
        self.frames_processed = 0;
        self.frames_skipped = 0;
        self.issues.clear();
        self.active_issues.clear();
        self.last_output = None;
    }
}
