pub mod input;
pub mod record;
pub mod schema;

pub use input::{
    Categorical, ChestPainType, ExerciseAngina, FastingBloodSugar, LabelError, ManualInput,
    RestingEcg, Sex, StSlope, Thallium, VesselCount,
};
pub use record::{FeatureRecord, FeatureValue};
pub use schema::{FEATURE_NAMES, feature_schema};
