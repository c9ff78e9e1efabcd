use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column names of the trip CSV layout, in file order.
pub const VENDOR_ID: &str = "vendor_id";
pub const RATE_CODE: &str = "rate_code";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const TRIP_TIME_IN_SECS: &str = "trip_time_in_secs";
pub const TRIP_DISTANCE: &str = "trip_distance";
pub const PAYMENT_TYPE: &str = "payment_type";
pub const FARE_AMOUNT: &str = "fare_amount";

/// Feature columns in the order their encodings are concatenated.
pub const FEATURE_COLUMNS: [&str; 6] = [
    VENDOR_ID,
    RATE_CODE,
    PASSENGER_COUNT,
    TRIP_TIME_IN_SECS,
    TRIP_DISTANCE,
    PAYMENT_TYPE,
];
/// The subset of [`FEATURE_COLUMNS`] that is one-hot encoded.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [VENDOR_ID, RATE_CODE, PAYMENT_TYPE];

/// One taxi trip. `fare_amount` is the training label; leave it at 0.0 for
/// trips whose fare is to be predicted.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub vendor_id: String,
    pub rate_code: String,
    pub passenger_count: f32,
    pub trip_time_in_secs: f32,
    pub trip_distance: f32,
    pub payment_type: String,
    pub fare_amount: f32,
}

impl TripRecord {
    /// Materialize the record as a one-row DataFrame with the same column
    /// names and dtypes the loader produces, so a single trip can flow
    /// through the fitted pipeline unchanged.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::Series(Series::new(VENDOR_ID.into(), vec![self.vendor_id.clone()])),
            Column::Series(Series::new(RATE_CODE.into(), vec![self.rate_code.clone()])),
            Column::Series(Series::new(
                PASSENGER_COUNT.into(),
                vec![self.passenger_count as f64],
            )),
            Column::Series(Series::new(
                TRIP_TIME_IN_SECS.into(),
                vec![self.trip_time_in_secs as f64],
            )),
            Column::Series(Series::new(
                TRIP_DISTANCE.into(),
                vec![self.trip_distance as f64],
            )),
            Column::Series(Series::new(
                PAYMENT_TYPE.into(),
                vec![self.payment_type.clone()],
            )),
            Column::Series(Series::new(FARE_AMOUNT.into(), vec![self.fare_amount as f64])),
        ])
    }
}

/// Reads one headered trip CSV into a DataFrame with the declared dtypes.
pub struct TripDataLoader {
    path: PathBuf,
}

impl TripDataLoader {
    /// Creates a loader for the given CSV file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            anyhow::bail!("input file not found: {}", path.display());
        }
        Ok(Self { path })
    }

    /// Loads the full file. Selecting the seven declared columns also
    /// rejects files that are missing any of them.
    pub fn load(&self) -> Result<DataFrame> {
        debug!(path = %self.path.display(), "Scanning trip CSV");

        let columns = vec![
            col(VENDOR_ID).cast(DataType::String),
            col(RATE_CODE).cast(DataType::String),
            col(PASSENGER_COUNT).cast(DataType::Float64),
            col(TRIP_TIME_IN_SECS).cast(DataType::Float64),
            col(TRIP_DISTANCE).cast(DataType::Float64),
            col(PAYMENT_TYPE).cast(DataType::String),
            col(FARE_AMOUNT).cast(DataType::Float64),
        ];

        let frame = LazyCsvReader::new(self.path.clone())
            .with_has_header(true)
            .finish()
            .with_context(|| format!("failed to open {}", self.path.display()))?
            .select(columns)
            .collect()
            .with_context(|| format!("failed to read trips from {}", self.path.display()))?;

        debug!(shape = ?frame.shape(), "Trip data loaded");
        Ok(frame)
    }
}
