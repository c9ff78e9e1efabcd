use crate::data_loader::{CATEGORICAL_COLUMNS, FARE_AMOUNT, FEATURE_COLUMNS};
use crate::error::FareError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name the target column carries once it leaves the pipeline.
pub const LABEL: &str = "label";

/// One-hot encoding for a single column, vocabulary fixed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OneHotEncoding {
    column: String,
    categories: Vec<String>,
}

impl OneHotEncoding {
    fn fit(frame: &DataFrame, column: &str) -> Result<Self, FareError> {
        let values = frame.column(column)?.str()?;
        if values.null_count() > 0 {
            return Err(FareError::MissingValue {
                column: column.to_string(),
            });
        }
        // BTreeSet gives a deduplicated, lexicographically ordered vocabulary,
        // so the column layout is stable across runs.
        let categories: BTreeSet<String> = values.into_iter().flatten().map(str::to_string).collect();
        Ok(Self {
            column: column.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    /// One 0/1 indicator column per learned category. A value outside the
    /// vocabulary encodes as zeros across the whole block.
    fn encode(&self, frame: &DataFrame) -> Result<Vec<Series>, FareError> {
        let values = frame.column(&self.column)?.str()?;
        if values.null_count() > 0 {
            return Err(FareError::MissingValue {
                column: self.column.clone(),
            });
        }
        let mut block = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            let indicators: Vec<f64> = values
                .into_iter()
                .map(|value| if value == Some(category.as_str()) { 1.0 } else { 0.0 })
                .collect();
            block.push(Series::new(
                format!("{}_{}", self.column, category).into(),
                indicators,
            ));
        }
        Ok(block)
    }

    fn width(&self) -> usize {
        self.categories.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum PipelineStep {
    Encode(OneHotEncoding),
    Passthrough(String),
}

/// Fitted feature transform: one-hot blocks for the categorical columns and
/// passthrough numerics, concatenated in schema order. Fitting freezes the
/// category vocabularies, so the output layout is identical for every frame
/// the pipeline later transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    steps: Vec<PipelineStep>,
}

impl FeaturePipeline {
    /// Learn the category vocabularies from a training frame.
    pub fn fit(frame: &DataFrame) -> Result<Self, FareError> {
        if frame.height() == 0 {
            return Err(FareError::EmptyData);
        }
        let mut steps = Vec::with_capacity(FEATURE_COLUMNS.len());
        for column in FEATURE_COLUMNS {
            if CATEGORICAL_COLUMNS.contains(&column) {
                steps.push(PipelineStep::Encode(OneHotEncoding::fit(frame, column)?));
            } else {
                let values = frame.column(column)?.f64()?;
                if values.null_count() > 0 {
                    return Err(FareError::MissingValue {
                        column: column.to_string(),
                    });
                }
                steps.push(PipelineStep::Passthrough(column.to_string()));
            }
        }
        Ok(Self { steps })
    }

    /// Apply the fitted encodings to a frame with the trip schema.
    pub fn transform(&self, frame: &DataFrame) -> Result<DataFrame, FareError> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.n_features_out());
        for step in &self.steps {
            match step {
                PipelineStep::Encode(encoding) => {
                    columns.extend(encoding.encode(frame)?.into_iter().map(Column::Series));
                }
                PipelineStep::Passthrough(name) => {
                    let values = frame.column(name)?.f64()?;
                    if values.null_count() > 0 {
                        return Err(FareError::MissingValue {
                            column: name.clone(),
                        });
                    }
                    columns.push(Column::Series(values.clone().into_series()));
                }
            }
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Copy of the fare column under the pipeline's label alias.
    pub fn labels(&self, frame: &DataFrame) -> Result<Series, FareError> {
        let values = frame.column(FARE_AMOUNT)?.f64()?;
        if values.null_count() > 0 {
            return Err(FareError::MissingValue {
                column: FARE_AMOUNT.to_string(),
            });
        }
        let mut labels = values.clone().into_series();
        labels.rename(LABEL.into());
        Ok(labels)
    }

    /// Width of the transformed feature matrix.
    pub fn n_features_out(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                PipelineStep::Encode(encoding) => encoding.width(),
                PipelineStep::Passthrough(_) => 1,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{
        PASSENGER_COUNT, PAYMENT_TYPE, RATE_CODE, TRIP_DISTANCE, TRIP_TIME_IN_SECS, VENDOR_ID,
    };

    fn trips(rows: &[(&str, &str, f64, f64, f64, &str, f64)]) -> DataFrame {
        let vendors: Vec<String> = rows.iter().map(|r| r.0.to_string()).collect();
        let rates: Vec<String> = rows.iter().map(|r| r.1.to_string()).collect();
        let passengers: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let times: Vec<f64> = rows.iter().map(|r| r.3).collect();
        let distances: Vec<f64> = rows.iter().map(|r| r.4).collect();
        let payments: Vec<String> = rows.iter().map(|r| r.5.to_string()).collect();
        let fares: Vec<f64> = rows.iter().map(|r| r.6).collect();
        DataFrame::new(vec![
            Column::Series(Series::new(VENDOR_ID.into(), vendors)),
            Column::Series(Series::new(RATE_CODE.into(), rates)),
            Column::Series(Series::new(PASSENGER_COUNT.into(), passengers)),
            Column::Series(Series::new(TRIP_TIME_IN_SECS.into(), times)),
            Column::Series(Series::new(TRIP_DISTANCE.into(), distances)),
            Column::Series(Series::new(PAYMENT_TYPE.into(), payments)),
            Column::Series(Series::new(FARE_AMOUNT.into(), fares)),
        ])
        .unwrap()
    }

    fn sample() -> DataFrame {
        trips(&[
            ("VTS", "1", 1.0, 600.0, 2.0, "CSH", 8.5),
            ("CMT", "1", 2.0, 1200.0, 4.5, "CRD", 15.0),
            ("VTS", "2", 1.0, 1800.0, 17.0, "CRD", 52.0),
        ])
    }

    #[test]
    fn test_fit_orders_categories_lexicographically() {
        let encoding = OneHotEncoding::fit(&sample(), VENDOR_ID).unwrap();
        assert_eq!(encoding.categories, vec!["CMT".to_string(), "VTS".to_string()]);
    }

    #[test]
    fn test_transform_layout_follows_schema_order() {
        let frame = sample();
        let pipeline = FeaturePipeline::fit(&frame).unwrap();
        let features = pipeline.transform(&frame).unwrap();
        let names: Vec<&str> = features.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "vendor_id_CMT",
                "vendor_id_VTS",
                "rate_code_1",
                "rate_code_2",
                "passenger_count",
                "trip_time_in_secs",
                "trip_distance",
                "payment_type_CRD",
                "payment_type_CSH",
            ]
        );
        assert_eq!(features.shape(), (3, 9));
        assert_eq!(pipeline.n_features_out(), 9);
    }

    #[test]
    fn test_transform_encodes_known_categories() {
        let frame = sample();
        let pipeline = FeaturePipeline::fit(&frame).unwrap();
        let features = pipeline.transform(&frame).unwrap();
        let vts = features.column("vendor_id_VTS").unwrap().f64().unwrap();
        assert_eq!(vts.get(0), Some(1.0));
        assert_eq!(vts.get(1), Some(0.0));
        let cmt = features.column("vendor_id_CMT").unwrap().f64().unwrap();
        assert_eq!(cmt.get(0), Some(0.0));
        assert_eq!(cmt.get(1), Some(1.0));
        let distance = features.column(TRIP_DISTANCE).unwrap().f64().unwrap();
        assert_eq!(distance.get(2), Some(17.0));
    }

    #[test]
    fn test_unknown_category_yields_zero_block() {
        let pipeline = FeaturePipeline::fit(&sample()).unwrap();
        let unseen = trips(&[("DDS", "1", 1.0, 300.0, 1.0, "CSH", 5.0)]);
        let features = pipeline.transform(&unseen).unwrap();
        let vts = features.column("vendor_id_VTS").unwrap().f64().unwrap();
        let cmt = features.column("vendor_id_CMT").unwrap().f64().unwrap();
        assert_eq!(vts.get(0), Some(0.0));
        assert_eq!(cmt.get(0), Some(0.0));
    }

    #[test]
    fn test_fit_rejects_empty_frame() {
        let err = FeaturePipeline::fit(&trips(&[])).unwrap_err();
        assert!(matches!(err, FareError::EmptyData));
    }

    #[test]
    fn test_transform_missing_column_is_an_error() {
        let frame = sample();
        let pipeline = FeaturePipeline::fit(&frame).unwrap();
        let truncated = frame.drop(PAYMENT_TYPE).unwrap();
        let err = pipeline.transform(&truncated).unwrap_err();
        assert!(matches!(err, FareError::DataLoading(_)));
    }

    #[test]
    fn test_null_categorical_is_rejected_at_fit() {
        let mut frame = sample();
        let with_null = Series::new(
            VENDOR_ID.into(),
            vec![Some("VTS".to_string()), None, Some("CMT".to_string())],
        );
        frame.replace(VENDOR_ID, with_null).unwrap();
        let err = FeaturePipeline::fit(&frame).unwrap_err();
        match err {
            FareError::MissingValue { column } => assert_eq!(column, VENDOR_ID),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_numeric_is_rejected_at_transform() {
        let pipeline = FeaturePipeline::fit(&sample()).unwrap();
        let mut frame = sample();
        let with_null = Series::new(TRIP_DISTANCE.into(), vec![Some(2.0), None, Some(17.0)]);
        frame.replace(TRIP_DISTANCE, with_null).unwrap();
        let err = pipeline.transform(&frame).unwrap_err();
        match err {
            FareError::MissingValue { column } => assert_eq!(column, TRIP_DISTANCE),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_labels_take_the_label_alias() {
        let frame = sample();
        let pipeline = FeaturePipeline::fit(&frame).unwrap();
        let labels = pipeline.labels(&frame).unwrap();
        assert_eq!(labels.name().as_str(), LABEL);
        let values = labels.f64().unwrap();
        assert_eq!(values.get(0), Some(8.5));
        assert_eq!(values.get(2), Some(52.0));
    }
}
