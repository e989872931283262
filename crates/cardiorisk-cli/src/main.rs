mod display;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cardiorisk_core::input::{
    AGE_RANGE, CHOLESTEROL_RANGE, MAX_HEART_RATE_RANGE, RESTING_BP_RANGE, ST_DEPRESSION_RANGE,
};
use cardiorisk_core::{
    Categorical, ChestPainType, ExerciseAngina, FastingBloodSugar, LabelError, ManualInput,
    RestingEcg, Sex, StSlope, Thallium, VesselCount,
};
use cardiorisk_model::batch::{DOWNLOAD_FILE_NAME, PREVIEW_ROWS, preview};
use cardiorisk_model::{
    DEFAULT_MODEL_FILE, ModelError, ModelLoader, ResolverConfig, predict_record, read_csv_file,
    score_batch,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardiorisk", version, about = "Heart disease risk prediction")]
struct Cli {
    /// Model artifact file name, searched under models/, src/, the base
    /// directory, and ../models/.
    #[arg(long, env = "CARDIORISK_MODEL_FILE", default_value = DEFAULT_MODEL_FILE, global = true)]
    model_file: String,

    /// Directory the artifact search starts from.
    #[arg(long, env = "CARDIORISK_BASE_DIR", default_value = ".", global = true)]
    base_dir: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict for one patient from form values
    Predict(PatientArgs),
    /// Score a CSV of pre-encoded rows and write the results
    Batch {
        /// CSV whose columns match the training data
        input: PathBuf,
        /// Where to write the scored CSV
        #[arg(short, long, default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,
        /// Rows to preview before and after scoring
        #[arg(long, default_value_t = PREVIEW_ROWS)]
        preview: usize,
    },
    /// Show the resolved model artifact
    Inspect,
    /// List the selectable form options and their codes
    Options,
}

/// Form fields. Defaults match the initial form state.
#[derive(clap::Args, Debug)]
struct PatientArgs {
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i64).range(AGE_RANGE))]
    age: i64,

    #[arg(long, default_value = "Male", value_parser = parse_label::<Sex>)]
    sex: Sex,

    #[arg(long, default_value = "Typical Angina (1)", value_parser = parse_label::<ChestPainType>)]
    chest_pain: ChestPainType,

    /// Resting blood pressure
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(i64).range(RESTING_BP_RANGE))]
    bp: i64,

    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(i64).range(CHOLESTEROL_RANGE))]
    cholesterol: i64,

    /// Fasting blood sugar > 120 mg/dl
    #[arg(long, default_value = "False (0)", value_parser = parse_label::<FastingBloodSugar>)]
    fbs: FastingBloodSugar,

    /// Resting ECG result
    #[arg(long, default_value = "Normal (0)", value_parser = parse_label::<RestingEcg>)]
    ecg: RestingEcg,

    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(i64).range(MAX_HEART_RATE_RANGE))]
    max_hr: i64,

    #[arg(long, default_value = "No (0)", value_parser = parse_label::<ExerciseAngina>)]
    exercise_angina: ExerciseAngina,

    /// ST depression (oldpeak), 0.0 to 10.0 in steps of 0.1
    #[arg(long, default_value_t = 0.0, value_parser = parse_st_depression)]
    st_depression: f64,

    #[arg(long, default_value = "Upsloping (1)", value_parser = parse_label::<StSlope>)]
    slope: StSlope,

    /// Number of vessels coloured by fluoroscopy (0-3)
    #[arg(long, default_value = "0", value_parser = parse_label::<VesselCount>)]
    vessels: VesselCount,

    #[arg(long, default_value = "Normal (3)", value_parser = parse_label::<Thallium>)]
    thallium: Thallium,

    /// Also print the encoded record sent to the model
    #[arg(long)]
    show_input: bool,
}

impl PatientArgs {
    fn to_input(&self) -> ManualInput {
        ManualInput {
            age: self.age,
            sex: self.sex,
            chest_pain: self.chest_pain,
            resting_bp: self.bp,
            cholesterol: self.cholesterol,
            fasting_blood_sugar: self.fbs,
            resting_ecg: self.ecg,
            max_heart_rate: self.max_hr,
            exercise_angina: self.exercise_angina,
            st_depression: self.st_depression,
            st_slope: self.slope,
            vessels: self.vessels,
            thallium: self.thallium,
        }
    }
}

fn parse_label<T: Categorical>(s: &str) -> Result<T, LabelError> {
    T::parse_label(s)
}

fn parse_st_depression(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if !ST_DEPRESSION_RANGE.contains(&v) {
        return Err(format!(
            "{v} is outside {}..={}",
            ST_DEPRESSION_RANGE.start(),
            ST_DEPRESSION_RANGE.end()
        ));
    }
    // The form steps in tenths.
    Ok((v * 10.0).round() / 10.0)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("cardiorisk v{}", env!("CARGO_PKG_VERSION"));

    let loader = ModelLoader::new(
        ResolverConfig::for_file(cli.model_file.clone()).with_base_dir(cli.base_dir.clone()),
    );

    match cli.command {
        Command::Options => display::print_options(),
        Command::Inspect => {
            let model = loader.load().map_err(report)?;
            display::print_model(&model);
        }
        Command::Predict(args) => {
            let model = loader.load().map_err(report)?;
            let record = args.to_input().encode();
            if args.show_input {
                display::print_record(&record);
            }
            let result = predict_record(&model, &record).map_err(report)?;
            display::print_prediction(&result);
        }
        Command::Batch {
            input,
            output,
            preview: rows,
        } => {
            let model = loader.load().map_err(report)?;
            let dataset = read_csv_file(&input).map_err(report)?;
            display::print_table("Uploaded Data Preview:", &preview(&dataset, rows))?;

            let scored = score_batch(&model, &dataset).map_err(report)?;
            display::print_batch_summary(&scored);
            display::print_table("Results Preview:", &preview(&scored.batch, rows))?;

            let csv = scored.to_csv().map_err(report)?;
            fs::write(&output, csv).with_context(|| format!("writing {}", output.display()))?;
            println!("Results written to {}", output.display());
        }
    }

    Ok(())
}

/// Print any follow-up advice before handing the error to anyhow.
fn report(err: ModelError) -> anyhow::Error {
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
    err.into()
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
