#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::metric::Metric;
    use crate::registry::DetectorRegistry;
    use std::env;
    use std::fs;
    use tempfile::NamedTempFile;

    const CUSTOM_EXERCISE: &str = r#"
        [landmarks]
        min_visibility = 0.6
        frame_width = 1280.0
        frame_height = 720.0

        [exercises.hammer_curl]
        kind = "bicep_curl"
        initial_feedback = "READY"
        start_phase = "empty"
        tolerance = 2.0

        [exercises.hammer_curl.progress]
        empty_angle = 150.0
        full_angle = 50.0

        [exercises.hammer_curl.progress.metric]
        type = "angle"
        a = "right_shoulder"
        vertex = "right_elbow"
        b = "right_wrist"

        [[exercises.hammer_curl.checks]]
        max = 45.0
        message = "KEEP YOUR ELBOW IN"

        [exercises.hammer_curl.checks.metric]
        type = "angle"
        a = "right_elbow"
        vertex = "right_shoulder"
        b = "right_hip"

        [exercises.hammer_curl.empty]
        feedback = "UP"

        [exercises.hammer_curl.full]
        feedback = "DOWN"
    "#;

    #[test]
    fn test_default_config_valid() {
        let config = FormcoachConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exercises.len(), 6);
    }

    #[test]
    fn test_config_validation_landmarks() {
        let mut config = FormcoachConfig::default();
        config.landmarks.min_visibility = 1.5;
        assert!(config.validate().is_err());

        config.landmarks.min_visibility = 0.5;
        config.landmarks.frame_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_exercise() {
        let mut config = FormcoachConfig::default();
        if let Some(squat) = config.exercises.get_mut("squat") {
            squat.progress.full_angle = squat.progress.empty_angle;
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exercises.squat"));

        let mut config = FormcoachConfig::default();
        if let Some(plank) = config.exercises.get_mut("plank") {
            plank.tolerance = 60.0;
        }
        assert!(config.validate().is_err());

        // inverted bounds
        let mut config = FormcoachConfig::default();
        if let Some(lunge) = config.exercises.get_mut("lunge") {
            lunge.gate[0].max = Some(100.0);
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_to_toml_string() {
        let config = FormcoachConfig::default();
        let toml_str = config.to_toml_string().unwrap();

        assert!(toml_str.contains("[landmarks]"));
        assert!(toml_str.contains("min_visibility"));
        assert!(toml_str.contains("deadlift"));
        assert!(toml_str.contains("KEEP HANDS CLOSE TO LEGS"));
    }

    #[test]
    fn test_toml_roundtrip_keeps_presets() {
        let original = FormcoachConfig::default();
        let toml_str = original.to_toml_string().unwrap();
        let parsed = FormcoachConfig::from_toml_str(&toml_str).unwrap();

        assert_eq!(parsed.exercises.len(), original.exercises.len());
        let (a, b) = (&original.exercises["deadlift"], &parsed.exercises["deadlift"]);
        assert_eq!(a.checks, b.checks);
        assert_eq!(a.progress.metric, b.progress.metric);
        assert_eq!(a.start_phase, b.start_phase);
        assert_eq!(
            parsed.exercises["plank"].count_repetitions,
            original.exercises["plank"].count_repetitions
        );
    }

    #[test]
    fn test_config_from_toml_string() {
        let config = FormcoachConfig::from_toml_str(CUSTOM_EXERCISE).unwrap();
        assert_eq!(config.landmarks.min_visibility, 0.6);
        assert_eq!(config.exercises.len(), 1);

        let curl = &config.exercises["hammer_curl"];
        assert_eq!(curl.kind, ExerciseKind::BicepCurl);
        assert_eq!(curl.tolerance, 2.0);
        // omitted fields take their defaults
        assert_eq!(curl.gate_frames, 1);
        assert!(curl.count_repetitions);
        assert!(curl.gate.is_empty());
        assert!(curl.bar.is_none());
        assert_eq!(
            curl.progress.metric,
            Metric::angle(
                crate::Joint::RightShoulder,
                crate::Joint::RightElbow,
                crate::Joint::RightWrist
            )
        );
        assert_eq!(curl.checks[0].message.as_deref(), Some("KEEP YOUR ELBOW IN"));
    }

    #[test]
    fn test_config_from_toml_rejects_invalid() {
        let invalid = CUSTOM_EXERCISE.replace("empty_angle = 150.0", "empty_angle = 50.0");
        assert!(matches!(
            FormcoachConfig::from_toml_str(&invalid),
            Err(ConfigError::Validation(_))
        ));

        assert!(matches!(
            FormcoachConfig::from_toml_str("[landmarks]\nmin_visibility = \"high\""),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), CUSTOM_EXERCISE).unwrap();

        let config = FormcoachConfig::from_file(file.path()).unwrap();
        assert!(config.exercises.contains_key("hammer_curl"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = FormcoachConfig::from_file("/nonexistent/formcoach.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_layered_merges_over_presets() {
        let user = NamedTempFile::new().unwrap();
        fs::write(user.path(), CUSTOM_EXERCISE).unwrap();

        let config = FormcoachConfig::load_layered(None, Some(user.path())).unwrap();
        // presets survive, the custom exercise is added
        assert!(config.exercises.contains_key("deadlift"));
        assert!(config.exercises.contains_key("hammer_curl"));
        assert_eq!(config.exercises.len(), 7);
        assert_eq!(config.landmarks.min_visibility, 0.6);

        let registry = DetectorRegistry::from_config(config).unwrap();
        assert!(registry.start_session("hammer_curl").is_ok());
    }

    #[test]
    fn test_load_layered_user_overrides_default_file() {
        let default = NamedTempFile::new().unwrap();
        fs::write(default.path(), CUSTOM_EXERCISE).unwrap();
        let user = NamedTempFile::new().unwrap();
        fs::write(
            user.path(),
            CUSTOM_EXERCISE.replace("tolerance = 2.0", "tolerance = 5.0"),
        )
        .unwrap();

        let config =
            FormcoachConfig::load_layered(Some(default.path()), Some(user.path())).unwrap();
        assert_eq!(config.exercises["hammer_curl"].tolerance, 5.0);
    }

    #[test]
    fn test_load_layered_without_files_is_presets() {
        let missing = std::path::Path::new("/nonexistent/formcoach.toml");
        let config = FormcoachConfig::load_layered(Some(missing), None).unwrap();
        assert_eq!(config.exercises.len(), 6);
    }

    #[test]
    fn test_env_override() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), CUSTOM_EXERCISE).unwrap();

        env::set_var("FORMCOACH_FRAME_HEIGHT", "1080");
        let config = FormcoachConfig::from_file_with_env(file.path());
        env::remove_var("FORMCOACH_FRAME_HEIGHT");

        assert_eq!(config.unwrap().landmarks.frame_height, 1080.0);
    }
}
