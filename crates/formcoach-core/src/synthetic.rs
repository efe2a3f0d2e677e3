//! Synthetic poses
//!
//! Builds landmark frames with exact joint angles, for tests and for the
//! CLI demo. Geometry is laid out in the default 640x480 pixel space and
//! normalized on `build`.

use std::collections::BTreeMap;

use crate::config::AccessorConfig;
use crate::landmarks::{Joint, Landmark, LandmarkFrame, Point};
use crate::presets::Side;

#[derive(Debug, Clone)]
pub struct PoseBuilder {
    frame_width: f32,
    frame_height: f32,
    points: BTreeMap<Joint, Point>,
    visibility: BTreeMap<Joint, f32>,
}

impl PoseBuilder {
    pub fn new() -> Self {
        Self::with_config(&AccessorConfig::default())
    }

    pub fn with_config(config: &AccessorConfig) -> Self {
        Self {
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            points: BTreeMap::new(),
            visibility: BTreeMap::new(),
        }
    }

    pub fn position(&self, joint: Joint) -> Option<Point> {
        self.points.get(&joint).copied()
    }

    pub fn place(mut self, joint: Joint, point: Point) -> Self {
        self.points.insert(joint, point);
        self
    }

    /// Place `joint` at `dx, dy` pixels from `from`. No-op if `from` is unplaced.
    pub fn place_offset(self, joint: Joint, from: Joint, dx: f32, dy: f32) -> Self {
        match self.position(from) {
            Some(origin) => self.place(joint, Point::new(origin.x + dx, origin.y + dy)),
            None => self,
        }
    }

    /// Place `joint` `length` pixels from `vertex` so that the angle
    /// `reference`-`vertex`-`joint` equals `angle` degrees.
    ///
    /// No-op if `vertex` or `reference` is unplaced or coincident.
    pub fn place_at_angle(
        self,
        joint: Joint,
        vertex: Joint,
        reference: Joint,
        angle: f32,
        length: f32,
    ) -> Self {
        let (v, r) = match (self.position(vertex), self.position(reference)) {
            (Some(v), Some(r)) => (v, r),
            _ => return self,
        };
        let (dx, dy) = (r.x - v.x, r.y - v.y);
        let norm = (dx * dx + dy * dy).sqrt();
        if norm < f32::EPSILON {
            return self;
        }
        let (ux, uy) = (dx / norm, dy / norm);
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotated = Point::new(
            v.x + length * (cos * ux - sin * uy),
            v.y + length * (sin * ux + cos * uy),
        );
        self.place(joint, rotated)
    }

    pub fn visibility(mut self, joint: Joint, visibility: f32) -> Self {
        self.visibility.insert(joint, visibility);
        self
    }

    pub fn remove(mut self, joint: Joint) -> Self {
        self.points.remove(&joint);
        self
    }

    pub fn build(&self, timestamp_us: i64) -> LandmarkFrame {
        let mut frame = LandmarkFrame::new(timestamp_us);
        for (&joint, point) in &self.points {
            let visibility = self.visibility.get(&joint).copied().unwrap_or(1.0);
            frame.insert(
                joint,
                Landmark::new(
                    point.x / self.frame_width,
                    point.y / self.frame_height,
                    visibility,
                ),
            );
        }
        frame
    }
}

impl Default for PoseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Side view, left side. `wrist_ankle_px` is the horizontal wrist offset.
pub fn deadlift_pose(hip: f32, knee: f32, back: f32, wrist_ankle_px: f32) -> PoseBuilder {
    PoseBuilder::new()
        .place(Joint::LeftHip, Point::new(320.0, 240.0))
        .place(Joint::LeftKnee, Point::new(320.0, 350.0))
        .place_at_angle(Joint::LeftAnkle, Joint::LeftKnee, Joint::LeftHip, knee, 100.0)
        .place_at_angle(Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee, hip, 120.0)
        .place_at_angle(Joint::LeftEar, Joint::LeftShoulder, Joint::LeftHip, back, 40.0)
        .place_offset(Joint::LeftWrist, Joint::LeftAnkle, wrist_ankle_px, 0.0)
}

/// `elbow` is shoulder-elbow-wrist, `shoulder` is elbow-shoulder-hip
pub fn curl_pose(side: Side, elbow: f32, shoulder: f32) -> PoseBuilder {
    let (s, e, w, h) = match side {
        Side::Right => (
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
        ),
        Side::Left => (
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
        ),
    };
    PoseBuilder::new()
        .place(s, Point::new(320.0, 150.0))
        .place(h, Point::new(320.0, 350.0))
        .place_at_angle(e, s, h, shoulder, 120.0)
        .place_at_angle(w, e, s, elbow, 110.0)
}

/// Front view. `stance` is ankle distance over shoulder width.
pub fn squat_pose(knee: f32, stance: f32) -> PoseBuilder {
    PoseBuilder::new()
        .place(Joint::LeftShoulder, Point::new(290.0, 120.0))
        .place(Joint::RightShoulder, Point::new(350.0, 120.0))
        .place(Joint::LeftHip, Point::new(300.0, 250.0))
        .place(Joint::LeftKnee, Point::new(300.0, 340.0))
        .place_at_angle(Joint::LeftAnkle, Joint::LeftKnee, Joint::LeftHip, knee, 100.0)
        .place_offset(Joint::RightAnkle, Joint::LeftAnkle, stance * 60.0, 0.0)
}

/// Side view, left leg forward
pub fn lunge_pose(front_knee: f32, back_knee: f32) -> PoseBuilder {
    PoseBuilder::new()
        .place(Joint::LeftHip, Point::new(320.0, 240.0))
        .place(Joint::LeftKnee, Point::new(320.0, 350.0))
        .place_at_angle(Joint::LeftAnkle, Joint::LeftKnee, Joint::LeftHip, front_knee, 100.0)
        .place(Joint::RightHip, Point::new(330.0, 240.0))
        .place(Joint::RightKnee, Point::new(330.0, 350.0))
        .place_at_angle(Joint::RightAnkle, Joint::RightKnee, Joint::RightHip, back_knee, 100.0)
}

/// Side view; `body` is the shoulder-hip-ankle angle
pub fn plank_pose(body: f32) -> PoseBuilder {
    PoseBuilder::new()
        .place(Joint::LeftShoulder, Point::new(200.0, 250.0))
        .place(Joint::LeftHip, Point::new(350.0, 250.0))
        .place_at_angle(Joint::LeftAnkle, Joint::LeftHip, Joint::LeftShoulder, body, 180.0)
}
