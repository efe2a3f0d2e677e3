//! Declarative body measurements and threshold checks.
//!
//! Exercise configurations describe what to measure (`Metric`) and which
//! range is acceptable (`Check`) instead of hard-coding joint indices and
//! thresholds in each detector.

use serde::{Deserialize, Serialize};

use crate::angle::angle_between;
use crate::landmarks::{Joint, LandmarkAccessor, LandmarkFrame};

/// A scalar measured on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metric {
    /// Interior angle at `vertex` in degrees, [0, 180]
    Angle { a: Joint, vertex: Joint, b: Joint },
    /// Pixel distance between two joints
    Distance { from: Joint, to: Joint },
    /// Ratio of two joint-to-joint pixel distances
    DistanceRatio {
        numerator: [Joint; 2],
        denominator: [Joint; 2],
    },
}

impl Metric {
    pub fn angle(a: Joint, vertex: Joint, b: Joint) -> Self {
        Metric::Angle { a, vertex, b }
    }

    pub fn distance(from: Joint, to: Joint) -> Self {
        Metric::Distance { from, to }
    }

    pub fn ratio(numerator: [Joint; 2], denominator: [Joint; 2]) -> Self {
        Metric::DistanceRatio {
            numerator,
            denominator,
        }
    }

    /// Joints this metric reads
    pub fn joints(&self) -> Vec<Joint> {
        match self {
            Metric::Angle { a, vertex, b } => vec![*a, *vertex, *b],
            Metric::Distance { from, to } => vec![*from, *to],
            Metric::DistanceRatio {
                numerator,
                denominator,
            } => vec![numerator[0], numerator[1], denominator[0], denominator[1]],
        }
    }

    /// Measure on `frame`; `None` when a joint is unresolved or the
    /// measurement is degenerate (zero-length denominator).
    pub fn evaluate(&self, accessor: &LandmarkAccessor, frame: &LandmarkFrame) -> Option<f32> {
        match self {
            Metric::Angle { a, vertex, b } => {
                let a = accessor.get(frame, *a)?;
                let vertex = accessor.get(frame, *vertex)?;
                let b = accessor.get(frame, *b)?;
                Some(angle_between(a, vertex, b))
            }
            Metric::Distance { from, to } => {
                let from = accessor.get(frame, *from)?;
                let to = accessor.get(frame, *to)?;
                Some(from.distance(&to))
            }
            Metric::DistanceRatio {
                numerator,
                denominator,
            } => {
                let num = accessor
                    .get(frame, numerator[0])?
                    .distance(&accessor.get(frame, numerator[1])?);
                let den = accessor
                    .get(frame, denominator[0])?
                    .distance(&accessor.get(frame, denominator[1])?);
                if den < 1e-3 {
                    return None;
                }
                Some(num / den)
            }
        }
    }
}

/// Acceptable range for a metric. Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub metric: Metric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Corrective feedback shown when the check fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Check {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            min: None,
            max: None,
            message: None,
        }
    }

    pub fn above(mut self, min: f32) -> Self {
        self.min = Some(min);
        self
    }

    pub fn below(mut self, max: f32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn accepts(&self, value: f32) -> bool {
        if let Some(min) = self.min {
            if !(value > min) {
                return false;
            }
        }
        if let Some(max) = self.max {
            if !(value < max) {
                return false;
            }
        }
        true
    }

    /// Undefined measurements fail the check.
    pub fn passes(&self, accessor: &LandmarkAccessor, frame: &LandmarkFrame) -> bool {
        self.metric
            .evaluate(accessor, frame)
            .map(|value| self.accepts(value))
            .unwrap_or(false)
    }
}

/// Evaluate `checks` in order, returning whether all passed and the
/// distinct messages of the ones that failed.
pub fn evaluate_checks(
    checks: &[Check],
    accessor: &LandmarkAccessor,
    frame: &LandmarkFrame,
) -> (bool, Vec<String>) {
    let mut all_passed = true;
    let mut messages: Vec<String> = Vec::new();

    for check in checks {
        if check.passes(accessor, frame) {
            continue;
        }
        all_passed = false;
        if let Some(message) = &check.message {
            if !messages.iter().any(|m| m == message) {
                messages.push(message.clone());
            }
        }
    }

    (all_passed, messages)
}
