use proptest::prelude::*;

/// Property-based tests for the angle calculator and the repetition
/// state machine.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::{angle_between, remap};
    use crate::landmarks::{Joint, LandmarkFrame, Point};
    use crate::presets::Side;
    use crate::registry::DetectorRegistry;
    use crate::synthetic::{curl_pose, deadlift_pose};
    use crate::TrackingState;

    fn point() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    // =========================================================================
    // Angle calculator
    // =========================================================================
    proptest! {
        #[test]
        fn test_angle_in_range(a in point(), v in point(), b in point()) {
            let angle = angle_between(a, v, b);
            prop_assert!((0.0..=180.0).contains(&angle));
        }

        #[test]
        fn test_angle_symmetric(a in point(), v in point(), b in point()) {
            let forward = angle_between(a, v, b);
            let backward = angle_between(b, v, a);
            prop_assert!((forward - backward).abs() < 1e-2);
        }

        #[test]
        fn test_remap_clamped(value in -1000.0f32..1000.0, lo in 0.0f32..90.0, hi in 91.0f32..180.0) {
            let rising = remap(value, (lo, hi), (0.0, 100.0));
            let falling = remap(value, (hi, lo), (0.0, 100.0));
            prop_assert!((0.0..=100.0).contains(&rising));
            prop_assert!((0.0..=100.0).contains(&falling));
            prop_assert!((rising + falling - 100.0).abs() < 1e-2);
        }
    }

    // =========================================================================
    // Repetition state machine
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_count_monotonic_half_steps(
            elbows in prop::collection::vec(0.0f32..180.0, 1..60),
        ) {
            let registry = DetectorRegistry::new();
            let mut session = registry.start_session("bicep_curl").unwrap();
            let mut last = 0.0f32;

            for (i, elbow) in elbows.iter().enumerate() {
                let frame = curl_pose(Side::Right, *elbow, 20.0).build(i as i64 * 33_000);
                let response = session.process(&frame);
                prop_assert!(response.repetition_count >= last);
                prop_assert!(response.repetition_count - last <= 0.5);
                prop_assert_eq!((response.repetition_count * 2.0).fract(), 0.0);
                prop_assert!((0.0..=100.0).contains(&response.completion));
                last = response.repetition_count;
            }
        }

        #[test]
        fn test_holding_a_phase_counts_once(
            hold in 1usize..30,
            elbow in 0.0f32..30.0,
        ) {
            let registry = DetectorRegistry::new();
            let mut session = registry.start_session("bicep_curl").unwrap();
            session.process(&curl_pose(Side::Right, 170.0, 20.0).build(0));

            for i in 0..hold {
                session.process(&curl_pose(Side::Right, elbow, 20.0).build(1 + i as i64));
            }
            prop_assert_eq!(session.summary().repetition_count, 0.5);
        }

        #[test]
        fn test_gate_decision_idempotent(
            hip in 40.0f32..180.0,
            knee in 100.0f32..180.0,
            back in 120.0f32..180.0,
            wrist in 0.0f32..120.0,
        ) {
            let registry = DetectorRegistry::new();
            let frame = deadlift_pose(hip, knee, back, wrist).build(0);

            let mut first = registry.start_session("deadlift").unwrap();
            let mut second = registry.start_session("deadlift").unwrap();
            let a = first.process(&frame);
            let b = second.process(&frame);
            prop_assert_eq!(&a, &b);

            if a.tracking == TrackingState::AwaitingForm {
                let again = first.process(&frame);
                prop_assert_eq!(again.tracking, TrackingState::AwaitingForm);
                prop_assert_eq!(&again.message, &a.message);
            }
        }

        #[test]
        fn test_gate_open_is_sticky(
            shoulders in prop::collection::vec(0.0f32..90.0, 1..30),
        ) {
            let registry = DetectorRegistry::new();
            let mut session = registry.start_session("bicep_curl").unwrap();
            session.process(&curl_pose(Side::Right, 170.0, 20.0).build(0));

            for (i, shoulder) in shoulders.iter().enumerate() {
                let response = session.process(
                    &curl_pose(Side::Right, 100.0, *shoulder).build(1 + i as i64),
                );
                prop_assert_eq!(response.tracking, TrackingState::Tracking);
            }
        }

        #[test]
        fn test_invisible_frames_change_nothing(
            elbows in prop::collection::vec(0.0f32..180.0, 1..20),
            hidden in prop::sample::select(vec![
                Joint::RightShoulder,
                Joint::RightElbow,
                Joint::RightWrist,
                Joint::RightHip,
            ]),
        ) {
            let registry = DetectorRegistry::new();
            let mut session = registry.start_session("bicep_curl").unwrap();
            for (i, elbow) in elbows.iter().enumerate() {
                session.process(&curl_pose(Side::Right, *elbow, 20.0).build(i as i64));
            }
            let before = session.detector().state().clone();

            let frame = curl_pose(Side::Right, 35.0, 20.0)
                .visibility(hidden, 0.1)
                .build(1_000);
            let response = session.process(&frame);
            session.process(&LandmarkFrame::new(1_001));

            let after = session.detector().state();
            prop_assert!(response.status.is_skipped());
            prop_assert_eq!(after.half_reps, before.half_reps);
            prop_assert_eq!(&after.feedback, &before.feedback);
            prop_assert_eq!(after.direction, before.direction);
            prop_assert_eq!(after.tracking, before.tracking);
        }
    }
}
