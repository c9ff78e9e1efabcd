pub mod config;
pub mod data_loader;
pub mod error;
pub mod feature_engineering;
pub mod metrics;
pub mod model;

pub use config::Config;
pub use data_loader::{TripDataLoader, TripRecord};
pub use error::FareError;
pub use feature_engineering::FeaturePipeline;
pub use metrics::{evaluate, RegressionReport};
pub use model::FareModel;

pub type BoxError = Box<dyn std::error::Error>;
