//! Pose Landmarks and Accessor
//!
//! Named body joints following the MediaPipe Pose 33-point layout, the
//! per-frame landmark container, and the accessor that resolves joints
//! into pixel-space points while rejecting low-confidence detections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AccessorConfig;

/// Number of rows in a MediaPipe Pose landmark array
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Body joints addressed by the exercise detectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const ALL: [Joint; 19] = [
        Joint::Nose,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    /// Row of this joint in a MediaPipe Pose landmark array
    pub fn index(&self) -> usize {
        match self {
            Joint::Nose => 0,
            Joint::LeftEar => 7,
            Joint::RightEar => 8,
            Joint::LeftShoulder => 11,
            Joint::RightShoulder => 12,
            Joint::LeftElbow => 13,
            Joint::RightElbow => 14,
            Joint::LeftWrist => 15,
            Joint::RightWrist => 16,
            Joint::LeftHip => 23,
            Joint::RightHip => 24,
            Joint::LeftKnee => 25,
            Joint::RightKnee => 26,
            Joint::LeftAnkle => 27,
            Joint::RightAnkle => 28,
            Joint::LeftHeel => 29,
            Joint::RightHeel => 30,
            Joint::LeftFootIndex => 31,
            Joint::RightFootIndex => 32,
        }
    }

    pub fn from_index(index: usize) -> Option<Joint> {
        Joint::ALL.iter().copied().find(|j| j.index() == index)
    }

    /// Human-readable name, for logs and messages
    pub fn name(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEar => "left ear",
            Joint::RightEar => "right ear",
            Joint::LeftShoulder => "left shoulder",
            Joint::RightShoulder => "right shoulder",
            Joint::LeftElbow => "left elbow",
            Joint::RightElbow => "right elbow",
            Joint::LeftWrist => "left wrist",
            Joint::RightWrist => "right wrist",
            Joint::LeftHip => "left hip",
            Joint::RightHip => "right hip",
            Joint::LeftKnee => "left knee",
            Joint::RightKnee => "right knee",
            Joint::LeftAnkle => "left ankle",
            Joint::RightAnkle => "right ankle",
            Joint::LeftHeel => "left heel",
            Joint::RightHeel => "right heel",
            Joint::LeftFootIndex => "left foot index",
            Joint::RightFootIndex => "right foot index",
        }
    }
}

/// A single detected landmark (normalized image coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// 0-1 normalized, left to right
    pub x: f32,
    /// 0-1 normalized, top to bottom
    pub y: f32,
    /// Relative depth, when the pose model reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detection confidence in [0, 1]
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility,
        }
    }
}

/// All landmarks reported for one video frame
///
/// May be partially populated; an empty frame means the pose model
/// found nobody.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in microseconds
    #[serde(default)]
    pub timestamp_us: i64,
    #[serde(default)]
    pub landmarks: BTreeMap<Joint, Landmark>,
}

impl LandmarkFrame {
    pub fn new(timestamp_us: i64) -> Self {
        Self {
            timestamp_us,
            landmarks: BTreeMap::new(),
        }
    }

    /// Build a frame from MediaPipe Pose rows of `[x, y, z, visibility]`.
    ///
    /// Rows beyond the joints this crate names are ignored, as are
    /// missing trailing rows.
    pub fn from_pose_array(rows: &[[f32; 4]], timestamp_us: i64) -> Self {
        let landmarks = Joint::ALL
            .iter()
            .filter_map(|&joint| {
                rows.get(joint.index()).map(|row| {
                    (
                        joint,
                        Landmark {
                            x: row[0],
                            y: row[1],
                            z: Some(row[2]),
                            visibility: row[3],
                        },
                    )
                })
            })
            .collect();

        Self {
            timestamp_us,
            landmarks,
        }
    }

    pub fn insert(&mut self, joint: Joint, landmark: Landmark) {
        self.landmarks.insert(joint, landmark);
    }

    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.insert(joint, landmark);
        self
    }

    pub fn get(&self, joint: Joint) -> Option<&Landmark> {
        self.landmarks.get(&joint)
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }
}

/// A joint position in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Resolves joints of a frame into pixel-space points.
///
/// Never fails: joints that are absent or whose visibility is below the
/// configured threshold resolve to `None`.
#[derive(Debug, Clone)]
pub struct LandmarkAccessor {
    min_visibility: f32,
    frame_width: f32,
    frame_height: f32,
}

impl LandmarkAccessor {
    pub fn new() -> Self {
        Self::with_config(&AccessorConfig::default())
    }

    pub fn with_config(config: &AccessorConfig) -> Self {
        Self {
            min_visibility: config.min_visibility,
            frame_width: config.frame_width,
            frame_height: config.frame_height,
        }
    }

    pub fn get(&self, frame: &LandmarkFrame, joint: Joint) -> Option<Point> {
        let landmark = frame.get(joint)?;
        if landmark.visibility.is_nan() || landmark.visibility < self.min_visibility {
            return None;
        }
        if !landmark.x.is_finite() || !landmark.y.is_finite() {
            return None;
        }
        Some(Point {
            x: landmark.x * self.frame_width,
            y: landmark.y * self.frame_height,
        })
    }

    /// Joints from `joints` that cannot be resolved in `frame`
    pub fn missing<I>(&self, frame: &LandmarkFrame, joints: I) -> Vec<Joint>
    where
        I: IntoIterator<Item = Joint>,
    {
        joints
            .into_iter()
            .filter(|&joint| self.get(frame, joint).is_none())
            .collect()
    }
}

impl Default for LandmarkAccessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for joint in Joint::ALL {
            assert_eq!(Joint::from_index(joint.index()), Some(joint));
        }
        assert_eq!(Joint::from_index(1), None);
        assert_eq!(Joint::from_index(40), None);
    }

    #[test]
    fn test_joint_names() {
        assert_eq!(Joint::LeftFootIndex.name(), "left foot index");
        let mut names: Vec<&str> = Joint::ALL.iter().map(Joint::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Joint::ALL.len());
    }

    #[test]
    fn test_get_scales_to_pixels() {
        let frame = LandmarkFrame::new(0).with(Joint::LeftKnee, Landmark::new(0.5, 0.25, 0.9));
        let accessor = LandmarkAccessor::new();
        let p = accessor.get(&frame, Joint::LeftKnee).unwrap();
        assert!((p.x - 320.0).abs() < 1e-4);
        assert!((p.y - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_low_visibility_is_missing() {
        let frame = LandmarkFrame::new(0)
            .with(Joint::LeftKnee, Landmark::new(0.5, 0.5, 0.1))
            .with(Joint::LeftHip, Landmark::new(0.5, 0.4, 0.5));
        let accessor = LandmarkAccessor::new();
        assert!(accessor.get(&frame, Joint::LeftKnee).is_none());
        // threshold is inclusive
        assert!(accessor.get(&frame, Joint::LeftHip).is_some());
        assert!(accessor.get(&frame, Joint::LeftAnkle).is_none());
        assert_eq!(
            accessor.missing(&frame, [Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle]),
            vec![Joint::LeftKnee, Joint::LeftAnkle]
        );
    }

    #[test]
    fn test_non_finite_coordinates_are_missing() {
        let frame =
            LandmarkFrame::new(0).with(Joint::Nose, Landmark::new(f32::NAN, 0.5, 1.0));
        assert!(LandmarkAccessor::new().get(&frame, Joint::Nose).is_none());
    }

    #[test]
    fn test_from_pose_array() {
        let mut rows = [[0.0f32; 4]; POSE_LANDMARK_COUNT];
        rows[Joint::RightWrist.index()] = [0.1, 0.2, -0.3, 0.8];
        let frame = LandmarkFrame::from_pose_array(&rows, 42);

        assert_eq!(frame.timestamp_us, 42);
        assert_eq!(frame.len(), Joint::ALL.len());
        let wrist = frame.get(Joint::RightWrist).unwrap();
        assert_eq!(wrist.z, Some(-0.3));
        assert_eq!(wrist.visibility, 0.8);
    }

    #[test]
    fn test_short_pose_array_is_partial() {
        let rows = [[0.5f32, 0.5, 0.0, 1.0]; 13];
        let frame = LandmarkFrame::from_pose_array(&rows, 0);
        assert!(frame.get(Joint::LeftShoulder).is_some());
        assert!(frame.get(Joint::LeftElbow).is_none());
    }

    #[test]
    fn test_frame_json_shape() {
        let json = r#"{
            "timestamp_us": 1000,
            "landmarks": {
                "left_shoulder": {"x": 0.4, "y": 0.3, "visibility": 0.9},
                "left_hip": {"x": 0.4, "y": 0.6}
            }
        }"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp_us, 1000);
        assert_eq!(frame.get(Joint::LeftHip).unwrap().visibility, 1.0);
        assert_eq!(frame.get(Joint::LeftShoulder).unwrap().z, None);
    }
}
