//! Terminal rendering for predictions, encoded inputs, and datasets.

use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use cardiorisk_core::{
    Categorical, ChestPainType, ExerciseAngina, FastingBloodSugar, FeatureRecord, FeatureValue,
    RestingEcg, Sex, StSlope, Thallium, VesselCount,
};
use cardiorisk_model::{Model, PredictionResult, ScoredBatch};

// ── Single prediction ──

/// Print the risk score and verdict for one patient.
pub fn print_prediction(result: &PredictionResult) {
    println!();
    println!("  {:<26} {}", "Risk Score", result.risk_score());
    let marker = if result.diagnosis.is_positive() {
        "!!"
    } else {
        "ok"
    };
    println!("  {:<26} [{marker}] {}", "Prediction", result.diagnosis.verdict());
    if result.probability.is_none() {
        println!("  (model has no probability estimates; risk score shown as 0)");
    }
}

/// Print the numeric record sent to the model.
pub fn print_record(record: &FeatureRecord) {
    println!("Model Input (Processed)");
    for (name, value) in record.fields() {
        match value {
            FeatureValue::Int(v) => println!("  {:<26} {}", name, v),
            FeatureValue::Float(v) => println!("  {:<26} {:.1}", name, v),
        }
    }
}

// ── Datasets ──

pub fn print_table(title: &str, batch: &RecordBatch) -> anyhow::Result<()> {
    println!("{title}");
    println!("{}", pretty_format_batches(std::slice::from_ref(batch))?);
    Ok(())
}

pub fn print_batch_summary(scored: &ScoredBatch) {
    println!(
        "Analysis completed: {} rows scored, {} predicted positive{}",
        scored.num_rows(),
        scored.positives,
        if scored.has_probability() {
            ""
        } else {
            " (no probability column)"
        }
    );
}

// ── Model ──

pub fn print_model(model: &Model) {
    println!("=== Model ===");
    println!("  {:<26} {}", "Source", model.source().display());
    println!("  {:<26} {}", "Estimator", model.kind());
    println!(
        "  {:<26} {}",
        "Probability estimates",
        if model.supports_proba() { "yes" } else { "no" }
    );
    let [neg, pos] = model.classes();
    println!("  {:<26} {} / {}", "Classes (neg / pos)", neg, pos);
    println!("  {:<26} {}", "Features", model.feature_names().join(", "));
}

// ── Form options ──

/// List every selectable option with its model code.
pub fn print_options() {
    print_option_set::<Sex>();
    print_option_set::<ChestPainType>();
    print_option_set::<FastingBloodSugar>();
    print_option_set::<RestingEcg>();
    print_option_set::<ExerciseAngina>();
    print_option_set::<StSlope>();
    print_option_set::<VesselCount>();
    print_option_set::<Thallium>();
}

fn print_option_set<T: Categorical>() {
    println!("{}", T::FIELD);
    for opt in T::ALL {
        println!("  {:<26} {}", opt.label(), opt.code());
    }
    println!();
}
