//! Feedback Aggregation
//!
//! Turns a detector's per-frame output into the transport-agnostic response
//! handed to the UI: one joined message, the count and the completion.

use serde::{Deserialize, Serialize};

use crate::detector::{DetectorOutput, FrameStatus, TrackingState};

/// Per-frame response for the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub timestamp_us: i64,
    /// Individual feedback strings, in order
    pub feedback: Vec<String>,
    /// `feedback` joined for display
    pub message: String,
    /// Non-negative, in steps of 0.5
    pub repetition_count: f32,
    /// 0-100
    pub completion: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_position: Option<f32>,
    pub tracking: TrackingState,
    pub status: FrameStatus,
}

/// Stateless; called once per processed frame.
pub fn aggregate(output: &DetectorOutput) -> FeedbackResponse {
    let feedback: Vec<String> = output
        .feedback
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    FeedbackResponse {
        timestamp_us: output.timestamp_us,
        message: feedback.join(" "),
        feedback,
        repetition_count: output.repetition_count.max(0.0),
        completion: output.completion.clamp(0.0, 100.0),
        bar_position: output.bar_position,
        tracking: output.tracking,
        status: output.status.clone(),
    }
}
