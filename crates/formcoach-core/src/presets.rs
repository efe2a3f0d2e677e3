//! Built-in exercise configurations
//!
//! Thresholds are heuristics in the accessor's pixel space (640x480 by
//! default). Every value can be overridden through a config file.

use std::collections::BTreeMap;

use crate::config::{
    BarConfig, ExerciseConfig, ExerciseKind, Phase, PhaseConfig, ProgressConfig,
};
use crate::landmarks::Joint;
use crate::metric::{Check, Metric};

/// Which arm a curl is tracked on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Every preset keyed by its session selector
pub fn default_exercises() -> BTreeMap<String, ExerciseConfig> {
    let mut exercises = BTreeMap::new();
    exercises.insert("deadlift".to_string(), deadlift());
    exercises.insert("bicep_curl".to_string(), bicep_curl(Side::Right));
    exercises.insert("bicep_curl_left".to_string(), bicep_curl(Side::Left));
    exercises.insert("squat".to_string(), squat());
    exercises.insert("lunge".to_string(), lunge());
    exercises.insert("plank".to_string(), plank());
    exercises
}

/// Side view, left side facing the camera.
///
/// Progress is the hip angle (shoulder-hip-knee), 60° with the bar on the
/// floor and 180° at lockout.
pub fn deadlift() -> ExerciseConfig {
    let form = vec![
        // ear-shoulder-hip reads ~180° with a neutral spine
        Check::new(Metric::angle(Joint::LeftEar, Joint::LeftShoulder, Joint::LeftHip))
            .above(160.0)
            .below(180.0)
            .message("KEEP YOUR BACK STRAIGHT"),
        Check::new(Metric::angle(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle))
            .above(160.0)
            .message("KEEP YOUR BACK STRAIGHT"),
        Check::new(Metric::distance(Joint::LeftWrist, Joint::LeftAnkle))
            .below(50.0)
            .message("KEEP HANDS CLOSE TO LEGS"),
    ];

    ExerciseConfig {
        kind: ExerciseKind::Deadlift,
        initial_feedback: "ADJUST YOUR FORM".to_string(),
        start_phase: Phase::Full,
        tolerance: 1.0,
        gate_frames: 1,
        count_repetitions: true,
        bar: Some(BarConfig::default()),
        progress: ProgressConfig {
            metric: Metric::angle(Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee),
            empty_angle: 60.0,
            full_angle: 180.0,
        },
        gate: form.clone(),
        checks: form,
        empty: PhaseConfig::new("LOWER THE BAR"),
        full: PhaseConfig::new("LOCKOUT"),
    }
}

/// Progress is the elbow angle (shoulder-elbow-wrist), 160° with the arm
/// extended and 40° fully curled. The upper arm must stay against the
/// body: the shoulder angle (elbow-shoulder-hip) below 40°.
pub fn bicep_curl(side: Side) -> ExerciseConfig {
    let (shoulder, elbow, wrist, hip) = match side {
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
    let elbow_angle = Metric::angle(shoulder, elbow, wrist);
    let shoulder_angle = Metric::angle(elbow, shoulder, hip);
    let tucked = Check::new(shoulder_angle).below(40.0);

    ExerciseConfig {
        kind: ExerciseKind::BicepCurl,
        initial_feedback: "LOWER YOUR ARM".to_string(),
        start_phase: Phase::Empty,
        tolerance: 1.0,
        gate_frames: 1,
        count_repetitions: true,
        bar: Some(BarConfig::default()),
        progress: ProgressConfig {
            metric: elbow_angle.clone(),
            empty_angle: 160.0,
            full_angle: 40.0,
        },
        gate: vec![tucked.clone()],
        checks: Vec::new(),
        empty: PhaseConfig {
            feedback: "UP".to_string(),
            requires: vec![Check::new(elbow_angle.clone()).above(160.0), tucked.clone()],
            otherwise: Some("LOWER YOUR ARM".to_string()),
        },
        full: PhaseConfig {
            feedback: "DOWN".to_string(),
            requires: vec![Check::new(elbow_angle).below(40.0), tucked],
            otherwise: Some("LOWER YOUR ARM".to_string()),
        },
    }
}

/// Front view. Progress is the left knee angle, 170° standing and 90° at
/// parallel. Stance width is the ankle distance over the shoulder width.
pub fn squat() -> ExerciseConfig {
    let stance = Metric::ratio(
        [Joint::LeftAnkle, Joint::RightAnkle],
        [Joint::LeftShoulder, Joint::RightShoulder],
    );
    let placement = vec![
        Check::new(stance.clone()).above(1.2).message("FEET TOO NARROW"),
        Check::new(stance).below(2.8).message("FEET TOO WIDE"),
    ];

    ExerciseConfig {
        kind: ExerciseKind::Squat,
        initial_feedback: "GET INTO POSITION".to_string(),
        start_phase: Phase::Empty,
        tolerance: 1.0,
        gate_frames: 3,
        count_repetitions: true,
        bar: Some(BarConfig::default()),
        progress: ProgressConfig {
            metric: Metric::angle(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
            empty_angle: 170.0,
            full_angle: 90.0,
        },
        gate: placement.clone(),
        checks: placement,
        empty: PhaseConfig::new("DOWN"),
        full: PhaseConfig::new("UP"),
    }
}

/// Side view, left leg forward. Progress is the front knee angle; at the
/// bottom both knees must sit between 60° and 125°.
pub fn lunge() -> ExerciseConfig {
    let front_knee = Metric::angle(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle);
    let back_knee = Metric::angle(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle);

    ExerciseConfig {
        kind: ExerciseKind::Lunge,
        initial_feedback: "STAND TALL TO START".to_string(),
        start_phase: Phase::Empty,
        tolerance: 1.0,
        gate_frames: 3,
        count_repetitions: true,
        bar: Some(BarConfig::default()),
        progress: ProgressConfig {
            metric: front_knee.clone(),
            empty_angle: 170.0,
            full_angle: 95.0,
        },
        gate: vec![Check::new(front_knee.clone())
            .above(150.0)
            .message("STAND TALL TO START")],
        checks: Vec::new(),
        empty: PhaseConfig::new("DOWN"),
        full: PhaseConfig {
            feedback: "UP".to_string(),
            requires: vec![
                Check::new(front_knee).above(60.0),
                Check::new(back_knee).above(60.0).below(125.0),
            ],
            otherwise: Some("BEND YOUR BACK KNEE".to_string()),
        },
    }
}

/// Side view. Progress is the body line (shoulder-hip-ankle); a plank is
/// a hold, so only phase feedback and time in form are reported.
pub fn plank() -> ExerciseConfig {
    let body_line = Metric::angle(Joint::LeftShoulder, Joint::LeftHip, Joint::LeftAnkle);

    ExerciseConfig {
        kind: ExerciseKind::Plank,
        initial_feedback: "GET INTO PLANK POSITION".to_string(),
        start_phase: Phase::Full,
        tolerance: 1.0,
        gate_frames: 5,
        count_repetitions: false,
        bar: None,
        progress: ProgressConfig {
            metric: body_line.clone(),
            empty_angle: 140.0,
            full_angle: 170.0,
        },
        gate: vec![Check::new(body_line.clone())
            .above(120.0)
            .message("GET INTO PLANK POSITION")],
        checks: vec![Check::new(body_line)
            .above(160.0)
            .message("KEEP YOUR HIPS IN LINE")],
        empty: PhaseConfig::new("KEEP YOUR HIPS IN LINE"),
        full: PhaseConfig::new("HOLD"),
    }
}
