//! Integration Tests for the Model Context
//!
//! Raw record → mapping → trained order → probability → bucket →
//! explanation, against in-memory and on-disk artifacts.

#[cfg(test)]
mod integration_tests {
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use crate::error::{ArtifactError, InferenceError};
    use crate::logic::features::{map_features, RawInput, FEATURE_COUNT, FEATURE_DEFS};
    use crate::logic::model::{
        ArtifactPaths, AttributionBaseline, LogisticModel, ModelContext, PredictOptions, RiskBucket,
        ThresholdConfig,
    };

    /// Trained order: mapper layout reversed, to exercise reordering
    fn trained_order() -> Vec<String> {
        FEATURE_DEFS.iter().rev().map(|d| d.name.to_string()).collect()
    }

    fn weight_for(name: &str) -> f64 {
        match name {
            "apnea_present_yes" => 1.4,
            "feeding_status_poor" => 0.9,
            "respiratory_distress_severe" => 1.1,
            "shock_present_yes" => 1.6,
            "heart_rate_bpm" => 0.01,
            "temperature_celsius" => 0.02,
            "feeding_status_normal" => -0.4,
            _ => 0.05,
        }
    }

    fn context_with(intercept: f64, thresholds: ThresholdConfig) -> ModelContext {
        let order = trained_order();
        let coefficients = order.iter().map(|n| weight_for(n)).collect();
        let baseline = AttributionBaseline::from_rows(vec![vec![0.0; FEATURE_COUNT]]).unwrap();

        ModelContext::from_parts(
            Box::new(LogisticModel::new(intercept, coefficients)),
            thresholds,
            order,
            baseline,
        )
        .unwrap()
    }

    fn context() -> ModelContext {
        context_with(-3.0, ThresholdConfig::default())
    }

    #[test]
    fn test_all_absent_input() {
        let ctx = context();
        let first = ctx.predict(&RawInput::new()).unwrap();
        let second = ctx.predict(&RawInput::new()).unwrap();

        // zero vector → margin is the intercept
        assert!((first.margin - (-3.0)).abs() < 1e-12);
        assert!(first.probability < 0.5);
        assert_eq!(first.label, 0);
        assert_eq!(first.bucket, RiskBucket::Low);
        assert_eq!(first, second);
    }

    #[test]
    fn test_probability_at_threshold_is_high() {
        let ctx = context_with(0.0, ThresholdConfig::default());
        let prediction = ctx.predict(&RawInput::new()).unwrap();

        assert_eq!(prediction.probability, 0.5);
        assert_eq!(prediction.label, 1);
        assert_eq!(prediction.bucket, RiskBucket::High);
        assert_eq!(prediction.confidence, 0.0);
    }

    #[test]
    fn test_sick_neonate_ranks_drivers() {
        let ctx = context();
        let raw = RawInput::new()
            .with("feeding_status", "poor")
            .with("respiratory_distress", "severe")
            .with("apnea_present", "yes")
            .with("shock_present", "yes");
        let prediction = ctx.predict(&raw).unwrap();

        // -3 + 1.4 + 0.9 + 1.1 + 1.6 = 2.0
        assert!((prediction.margin - 2.0).abs() < 1e-9);
        assert_eq!(prediction.bucket, RiskBucket::High);

        let top: Vec<&str> = prediction.top(4).iter().map(|a| a.feature.as_str()).collect();
        assert_eq!(
            top,
            vec![
                "shock_present_yes",
                "apnea_present_yes",
                "respiratory_distress_severe",
                "feeding_status_poor"
            ]
        );

        let magnitudes: Vec<f64> = prediction
            .explanation
            .attributions
            .iter()
            .map(|a| a.impact.abs())
            .collect();
        assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(prediction.explanation.attributions.len(), FEATURE_COUNT);
        assert!((prediction.explanation.reconstructed_margin() - prediction.margin).abs() < 1e-9);
    }

    #[test]
    fn test_moderate_bucket() {
        let ctx = context_with(-3.0, ThresholdConfig::new(0.9, 0.4).unwrap());
        let raw = RawInput::new()
            .with("apnea_present", "yes")
            .with("shock_present", "yes");
        // margin ≈ 0 → p ≈ 0.5
        let prediction = ctx.predict(&raw).unwrap();
        assert_eq!(prediction.bucket, RiskBucket::Moderate);
        assert_eq!(prediction.label, 0);
        assert!((prediction.confidence - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_validation_error_propagates() {
        let ctx = context();
        let raw = RawInput::new().with("pv_examinations_count", "abc");
        let err = ctx.predict(&raw).unwrap_err();
        assert!(matches!(err, InferenceError::Validation(ref e) if e.field == "pv_examinations_count"));
    }

    #[test]
    fn test_schema_mismatch_per_request() {
        let mut order = trained_order();
        order[0] = "crp_mg_l".to_string();
        let baseline = AttributionBaseline::from_rows(vec![vec![0.0; FEATURE_COUNT]]).unwrap();
        let ctx = ModelContext::from_parts(
            Box::new(LogisticModel::new(0.0, vec![0.1; FEATURE_COUNT])),
            ThresholdConfig::default(),
            order,
            baseline,
        )
        .unwrap();

        assert!(!ctx.metadata().layout_compatible());
        assert_eq!(ctx.metadata().unmapped_features, vec!["crp_mg_l"]);

        let err = ctx.predict(&RawInput::new()).unwrap_err();
        match err {
            InferenceError::SchemaMismatch(e) => assert_eq!(e.missing, vec!["crp_mg_l"]),
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_model_may_use_subset_of_layout() {
        let order = vec!["apnea_present_yes".to_string(), "heart_rate_bpm".to_string()];
        let baseline = AttributionBaseline::from_rows(vec![vec![0.0, 140.0]]).unwrap();
        let ctx = ModelContext::from_parts(
            Box::new(LogisticModel::new(-1.0, vec![2.0, 0.05])),
            ThresholdConfig::default(),
            order,
            baseline,
        )
        .unwrap();

        assert_eq!(ctx.metadata().unused_features.len(), FEATURE_COUNT - 2);

        let prediction = ctx.predict(&RawInput::new().with("heart_rate_bpm", 160)).unwrap();
        let hr = &prediction.explanation.attributions[0];
        assert_eq!(hr.feature, "heart_rate_bpm");
        assert!((hr.impact - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_parts_rejects_inconsistent_artifacts() {
        let baseline = AttributionBaseline::from_rows(vec![vec![0.0; 2]]).unwrap();

        let width = ModelContext::from_parts(
            Box::new(LogisticModel::new(0.0, vec![1.0; 3])),
            ThresholdConfig::default(),
            vec!["a".into(), "b".into()],
            baseline.clone(),
        );
        assert!(matches!(width, Err(ArtifactError::Invalid { artifact: "model", .. })));

        let duplicate = ModelContext::from_parts(
            Box::new(LogisticModel::new(0.0, vec![1.0; 2])),
            ThresholdConfig::default(),
            vec!["a".into(), "a".into()],
            baseline.clone(),
        );
        assert!(matches!(duplicate, Err(ArtifactError::Invalid { artifact: "feature_order", .. })));

        let columns = ModelContext::from_parts(
            Box::new(LogisticModel::new(0.0, vec![1.0; 3])),
            ThresholdConfig::default(),
            vec!["a".into(), "b".into(), "c".into()],
            baseline,
        );
        assert!(matches!(columns, Err(ArtifactError::Invalid { artifact: "background", .. })));
    }

    #[test]
    fn test_respond_shapes_output() {
        let ctx = context();
        let raw = RawInput::new().with("apnea_present", "yes");
        let response = ctx.respond(&raw, &PredictOptions::default()).unwrap();

        assert_eq!(response.shap_top5.len(), 5);
        assert_eq!(response.shap_top5[0].feature, "apnea_present_yes");
        assert_eq!(response.shap_top5[0].display_name, "Apnea present");
        assert_eq!(response.shap_all_features.as_ref().map(Vec::len), Some(FEATURE_COUNT));
        assert!(response.shap_expected_value.is_some());

        let scaled = (response.sepsis_probability * 10_000.0).round();
        assert_eq!(response.sepsis_probability, scaled / 10_000.0);
    }

    #[test]
    fn test_predict_vector_matches_predict() {
        let ctx = context();
        let raw = RawInput::new().with("temperature_celsius", 38.7).with("feeding_status", "normal");
        let vector = map_features(&raw).unwrap();
        assert_eq!(ctx.predict(&raw).unwrap(), ctx.predict_vector(&vector).unwrap());
    }

    #[test]
    fn test_shared_across_threads() {
        let ctx = Arc::new(context());
        let expected = ctx.predict(&RawInput::new().with("apnea_present", "yes")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || ctx.predict(&RawInput::new().with("apnea_present", "yes")).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let order = trained_order();
        let model = serde_json::json!({
            "model_type": "logistic_regression",
            "version": "2025.03-lr",
            "intercept": -3.0,
            "coefficients": order.iter().map(|n| weight_for(n)).collect::<Vec<_>>(),
            "threshold": 0.55,
            "moderate_threshold": 0.25,
        });
        fs::write(dir.path().join("model.json"), model.to_string()).unwrap();
        fs::write(dir.path().join("feature_order.json"), serde_json::to_string(&order).unwrap()).unwrap();
        fs::write(
            dir.path().join("shap_background.json"),
            serde_json::to_string(&vec![vec![0.0; FEATURE_COUNT]; 3]).unwrap(),
        )
        .unwrap();

        let ctx = ModelContext::load(&ArtifactPaths::in_dir(dir.path())).unwrap();
        assert_eq!(ctx.metadata().model_version, "2025.03-lr");
        assert_eq!(ctx.metadata().baseline_samples, 3);
        assert_eq!(ctx.metadata().digests.len(), 3);
        assert_eq!(ctx.thresholds().threshold, 0.55);
        assert!(ctx.metadata().layout_compatible());

        let in_memory = context();
        let raw = RawInput::new().with("shock_present", "yes");
        assert_eq!(
            ctx.predict(&raw).unwrap().probability,
            in_memory.predict(&raw).unwrap().probability
        );
    }

    #[test]
    fn test_load_rejects_bad_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let model = serde_json::json!({
            "model_type": "logistic_regression",
            "intercept": 0.0,
            "coefficients": [1.0],
            "threshold": 0.2,
            "moderate_threshold": 0.4,
        });
        fs::write(dir.path().join("model.json"), model.to_string()).unwrap();
        fs::write(dir.path().join("feature_order.json"), r#"["heart_rate_bpm"]"#).unwrap();
        fs::write(dir.path().join("shap_background.json"), "[[120.0]]").unwrap();

        let err = ModelContext::load(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid { artifact: "model", .. }));
    }
}
