//! End-to-end flow over the public API: train an artifact from a labeled
//! CSV, load it back, and run assessments through the service.

use std::io::Write;
use std::sync::Arc;

use crkp_risk::application::AssessmentService;
use crkp_risk::domain::{PatientIndicators, RiskLevel, FEATURE_NAMES};
use crkp_risk::model::ModelArtifact;
use crkp_risk::ports::RiskModel;
use crkp_risk::training::{run, TrainingConfig};

/// 100-row synthetic cohort, imbalanced 4:1. Resistant patients carry long
/// device/antibiotic exposure, low albumin, and higher age.
fn write_cohort(path: &std::path::Path) {
    let mut file = std::fs::File::create(path).expect("create csv");
    writeln!(file, "{},Carbapenem Resistance", FEATURE_NAMES.join(",")).expect("write header");

    for i in 0..80 {
        let j = (i % 8) as f64;
        writeln!(
            file,
            "{},0,0,{},0,0,0,0,{},{},0,0,0",
            j,
            j * 0.25,
            37.0 + j * 0.5,
            40.0 + j * 2.0,
        )
        .expect("write row");
    }
    for i in 0..20 {
        let j = (i % 8) as f64;
        writeln!(
            file,
            "{},1,1,{},1,1,1,0,{},{},1,{},1",
            12.0 + j,
            9.0 + j * 0.5,
            24.0 + j * 0.4,
            68.0 + j,
            6.0 + j * 0.25,
        )
        .expect("write row");
    }
}

fn train_artifact(dir: &std::path::Path) -> std::path::PathBuf {
    let csv = dir.join("cohort.csv");
    let out = dir.join("model.json");
    write_cohort(&csv);

    let mut config = TrainingConfig::new(csv, out.clone());
    config.gbdt.n_trees = 40;
    config.gbdt.max_depth = 3;
    run(&config).expect("training must succeed");
    out
}

#[test]
fn trained_artifact_serves_assessments() {
    let dir = tempfile::tempdir().expect("tempdir");
    let artifact_path = train_artifact(dir.path());

    let artifact = ModelArtifact::load(&artifact_path).expect("load artifact");
    let expected: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    assert_eq!(artifact.feature_names(), expected.as_slice());

    let service = AssessmentService::new(Arc::new(artifact));

    let low_exposure = PatientIndicators {
        days_carbapenems: 1.0,
        albumin: 39.0,
        age: 44.0,
        ..PatientIndicators::default()
    };
    let high_exposure = PatientIndicators {
        days_urinary_catheter: 15.0,
        vascular_disease: 1.0,
        respiratory_disease: 1.0,
        days_carbapenems: 11.0,
        icu_admission: 1.0,
        metabolic_abnormality: 1.0,
        respiratory_infection: 1.0,
        albumin: 25.0,
        age: 71.0,
        digestive_disease: 1.0,
        days_beta_lactamase: 7.0,
        ..PatientIndicators::default()
    };

    let a = service.assess(&low_exposure).expect("assess");
    let b = service.assess(&high_exposure).expect("assess");
    assert!((0.0..=1.0).contains(&a.result.probability));
    assert!((0.0..=1.0).contains(&b.result.probability));
    assert!(b.result.probability > a.result.probability);
    assert_eq!(a.risk_level, RiskLevel::Low);

    // Same input twice gives the same answer.
    let again = service.assess(&high_exposure).expect("assess");
    assert_eq!(again.result.probability, b.result.probability);
}

#[test]
fn invalid_indicators_are_rejected_by_the_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let artifact_path = train_artifact(dir.path());
    let artifact = ModelArtifact::load(&artifact_path).expect("load artifact");
    let service = AssessmentService::new(Arc::new(artifact));

    let out_of_range = PatientIndicators {
        age: 200.0,
        ..PatientIndicators::default()
    };
    assert!(service.assess(&out_of_range).is_err());
}

#[test]
fn corrupt_artifact_never_yields_a_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.json");
    std::fs::write(&path, "not a model").expect("write");
    assert!(ModelArtifact::load(&path).is_err());
}
