//! Manual input form: closed categorical selections and their numeric codes.
//!
//! Each selectable field is a closed enum whose `code()` is the value the
//! model was trained on. The mapping is an exhaustive `match`, so there is no
//! way to reach the encoder with an unmapped label. Free-form strings only
//! enter through [`Categorical::parse_label`] at the presentation edge.
//!
//! Numeric fields carry their form ranges as constants. Range checks belong
//! to whatever collects the input; [`ManualInput::encode`] does not repeat
//! them.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::FeatureRecord;

pub const AGE_RANGE: RangeInclusive<i64> = 10..=100;
pub const RESTING_BP_RANGE: RangeInclusive<i64> = 90..=200;
pub const CHOLESTEROL_RANGE: RangeInclusive<i64> = 100..=600;
pub const MAX_HEART_RATE_RANGE: RangeInclusive<i64> = 60..=220;
pub const ST_DEPRESSION_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// A form label that matches none of a field's options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised {field} option {value:?} (expected one of: {expected})")]
pub struct LabelError {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

/// A closed set of form options with fixed numeric codes.
pub trait Categorical: Copy + Sized + 'static {
    /// Human-readable field name, used in error messages.
    const FIELD: &'static str;
    /// Every option, in form order. The first entry is the form default.
    const ALL: &'static [Self];

    /// Label as shown on the form.
    fn label(self) -> &'static str;

    /// Numeric code the model was trained on.
    fn code(self) -> i64;

    /// Parse a form label.
    ///
    /// Accepts the exact label (ASCII case-insensitive, surrounding
    /// whitespace ignored) or the bare numeric code.
    fn parse_label(s: &str) -> Result<Self, LabelError> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|opt| opt.label().eq_ignore_ascii_case(s) || opt.code().to_string() == s)
            .ok_or_else(|| LabelError {
                field: Self::FIELD,
                value: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|opt| opt.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

macro_rules! label_traits {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = LabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Categorical>::parse_label(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

// ── Option tables ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Categorical for Sex {
    const FIELD: &'static str = "sex";
    const ALL: &'static [Self] = &[Self::Male, Self::Female];

    fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChestPainType {
    #[serde(rename = "Typical Angina (1)")]
    TypicalAngina,
    #[serde(rename = "Atypical Angina (2)")]
    AtypicalAngina,
    #[serde(rename = "Non-Anginal Pain (3)")]
    NonAnginalPain,
    #[serde(rename = "Asymptomatic (4)")]
    Asymptomatic,
}

impl Categorical for ChestPainType {
    const FIELD: &'static str = "chest pain type";
    const ALL: &'static [Self] = &[
        Self::TypicalAngina,
        Self::AtypicalAngina,
        Self::NonAnginalPain,
        Self::Asymptomatic,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::TypicalAngina => "Typical Angina (1)",
            Self::AtypicalAngina => "Atypical Angina (2)",
            Self::NonAnginalPain => "Non-Anginal Pain (3)",
            Self::Asymptomatic => "Asymptomatic (4)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::TypicalAngina => 1,
            Self::AtypicalAngina => 2,
            Self::NonAnginalPain => 3,
            Self::Asymptomatic => 4,
        }
    }
}

/// Fasting blood sugar above 120 mg/dl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FastingBloodSugar {
    #[serde(rename = "False (0)")]
    NotElevated,
    #[serde(rename = "True (1)")]
    Elevated,
}

impl Categorical for FastingBloodSugar {
    const FIELD: &'static str = "fasting blood sugar > 120 mg/dl";
    const ALL: &'static [Self] = &[Self::NotElevated, Self::Elevated];

    fn label(self) -> &'static str {
        match self {
            Self::NotElevated => "False (0)",
            Self::Elevated => "True (1)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::NotElevated => 0,
            Self::Elevated => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestingEcg {
    #[serde(rename = "Normal (0)")]
    Normal,
    #[serde(rename = "ST-T Abnormality (1)")]
    StTAbnormality,
    #[serde(rename = "LV Hypertrophy (2)")]
    LvHypertrophy,
}

impl Categorical for RestingEcg {
    const FIELD: &'static str = "resting ECG result";
    const ALL: &'static [Self] = &[Self::Normal, Self::StTAbnormality, Self::LvHypertrophy];

    fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal (0)",
            Self::StTAbnormality => "ST-T Abnormality (1)",
            Self::LvHypertrophy => "LV Hypertrophy (2)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Normal => 0,
            Self::StTAbnormality => 1,
            Self::LvHypertrophy => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseAngina {
    #[serde(rename = "No (0)")]
    No,
    #[serde(rename = "Yes (1)")]
    Yes,
}

impl Categorical for ExerciseAngina {
    const FIELD: &'static str = "exercise angina";
    const ALL: &'static [Self] = &[Self::No, Self::Yes];

    fn label(self) -> &'static str {
        match self {
            Self::No => "No (0)",
            Self::Yes => "Yes (1)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
        }
    }
}

/// Slope of the peak exercise ST segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StSlope {
    #[serde(rename = "Upsloping (1)")]
    Upsloping,
    #[serde(rename = "Flat (2)")]
    Flat,
    #[serde(rename = "Downsloping (3)")]
    Downsloping,
}

impl Categorical for StSlope {
    const FIELD: &'static str = "slope of ST";
    const ALL: &'static [Self] = &[Self::Upsloping, Self::Flat, Self::Downsloping];

    fn label(self) -> &'static str {
        match self {
            Self::Upsloping => "Upsloping (1)",
            Self::Flat => "Flat (2)",
            Self::Downsloping => "Downsloping (3)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Upsloping => 1,
            Self::Flat => 2,
            Self::Downsloping => 3,
        }
    }
}

/// Number of major vessels coloured by fluoroscopy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VesselCount {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Categorical for VesselCount {
    const FIELD: &'static str = "number of vessels fluro";
    const ALL: &'static [Self] = &[Self::Zero, Self::One, Self::Two, Self::Three];

    fn label(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Thallium stress test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thallium {
    #[serde(rename = "Normal (3)")]
    Normal,
    #[serde(rename = "Fixed Defect (6)")]
    FixedDefect,
    #[serde(rename = "Reversible Defect (7)")]
    ReversibleDefect,
}

impl Categorical for Thallium {
    const FIELD: &'static str = "thallium test";
    const ALL: &'static [Self] = &[Self::Normal, Self::FixedDefect, Self::ReversibleDefect];

    fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal (3)",
            Self::FixedDefect => "Fixed Defect (6)",
            Self::ReversibleDefect => "Reversible Defect (7)",
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Normal => 3,
            Self::FixedDefect => 6,
            Self::ReversibleDefect => 7,
        }
    }
}

label_traits!(Sex);
label_traits!(ChestPainType);
label_traits!(FastingBloodSugar);
label_traits!(RestingEcg);
label_traits!(ExerciseAngina);
label_traits!(StSlope);
label_traits!(VesselCount);
label_traits!(Thallium);

// ── Form ──

/// The thirteen selections collected by the manual prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualInput {
    pub age: i64,
    pub sex: Sex,
    pub chest_pain: ChestPainType,
    pub resting_bp: i64,
    pub cholesterol: i64,
    pub fasting_blood_sugar: FastingBloodSugar,
    pub resting_ecg: RestingEcg,
    pub max_heart_rate: i64,
    pub exercise_angina: ExerciseAngina,
    pub st_depression: f64,
    pub st_slope: StSlope,
    pub vessels: VesselCount,
    pub thallium: Thallium,
}

impl Default for ManualInput {
    /// Initial form state: mid-range numerics and the first option of every
    /// selection.
    fn default() -> Self {
        Self {
            age: 50,
            sex: Sex::Male,
            chest_pain: ChestPainType::TypicalAngina,
            resting_bp: 120,
            cholesterol: 200,
            fasting_blood_sugar: FastingBloodSugar::NotElevated,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 150,
            exercise_angina: ExerciseAngina::No,
            st_depression: 0.0,
            st_slope: StSlope::Upsloping,
            vessels: VesselCount::Zero,
            thallium: Thallium::Normal,
        }
    }
}

impl ManualInput {
    /// Encode the form into the model's numeric feature record.
    pub fn encode(&self) -> FeatureRecord {
        FeatureRecord {
            age: self.age,
            sex: self.sex.code(),
            chest_pain_type: self.chest_pain.code(),
            bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fbs_over_120: self.fasting_blood_sugar.code(),
            ekg_results: self.resting_ecg.code(),
            max_hr: self.max_heart_rate,
            exercise_angina: self.exercise_angina.code(),
            st_depression: self.st_depression,
            slope_of_st: self.st_slope.code(),
            vessels_fluro: self.vessels.code(),
            thallium: self.thallium.code(),
        }
    }
}
