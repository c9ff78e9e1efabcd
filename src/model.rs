use crate::config::ModelParams;
use crate::data_loader::TripRecord;
use crate::error::FareError;
use crate::feature_engineering::FeaturePipeline;
use gbdt::config::Config as BoosterConfig;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Trained fare regressor. The fitted feature pipeline and the boosted
/// ensemble travel together, so a reloaded model always encodes input with
/// the vocabularies it was trained on.
#[derive(Serialize, Deserialize)]
pub struct FareModel {
    pipeline: FeaturePipeline,
    booster: GBDT,
}

impl FareModel {
    /// Fit the feature pipeline on a raw trip frame, then train the booster
    /// on the transformed features.
    pub fn fit(frame: &DataFrame, params: &ModelParams) -> Result<Self, FareError> {
        let pipeline = FeaturePipeline::fit(frame)?;
        let features = pipeline.transform(frame)?;
        let labels = pipeline.labels(frame)?;
        debug!(shape = ?features.shape(), "Features transformed for training");

        let mut config = BoosterConfig::new();
        config.set_feature_size(pipeline.n_features_out());
        config.set_iterations(params.iterations);
        config.set_max_depth(params.max_depth);
        config.set_shrinkage(params.learning_rate);
        config.set_loss("SquaredError");
        config.set_debug(false);
        // Full sampling ratios keep training deterministic for a fixed input.
        config.set_data_sample_ratio(1.0);
        config.set_feature_sample_ratio(1.0);
        config.set_training_optimization_level(2);

        let mut train_data = training_datavec(&features, &labels)?;
        let mut booster = GBDT::new(&config);
        booster.fit(&mut train_data);
        info!(
            rows = frame.height(),
            features = pipeline.n_features_out(),
            iterations = params.iterations,
            "Fare model trained"
        );

        Ok(Self { pipeline, booster })
    }

    /// Predict a fare for every row of a raw trip frame.
    pub fn predict(&self, frame: &DataFrame) -> Result<Vec<f32>, FareError> {
        let features = self.pipeline.transform(frame)?;
        let test_data = feature_datavec(&features)?;
        Ok(self.booster.predict(&test_data))
    }

    /// Predict the fare for a single trip.
    pub fn predict_record(&self, record: &TripRecord) -> Result<f32, FareError> {
        let frame = record.to_frame()?;
        let predictions = self.predict(&frame)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| FareError::Model("prediction returned no rows".to_string()))
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Persist the whole model to a single binary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FareError> {
        let encoded = bincode::serialize(self)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Restore a model written by [`FareModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FareError> {
        let encoded = fs::read(path)?;
        Ok(bincode::deserialize(&encoded)?)
    }
}

fn training_datavec(features: &DataFrame, labels: &Series) -> Result<DataVec, FareError> {
    let labels = labels.f64()?;
    let rows = feature_rows(features)?;
    debug_assert_eq!(rows.len(), labels.len());
    Ok(rows
        .into_iter()
        .zip(labels.into_no_null_iter())
        .map(|(feature, label)| Data::new_training_data(feature, 1.0, label as f32, None))
        .collect())
}

fn feature_datavec(features: &DataFrame) -> Result<DataVec, FareError> {
    Ok(feature_rows(features)?
        .into_iter()
        .map(|feature| Data::new_test_data(feature, None))
        .collect())
}

// Column-major walk over the transformed frame; the pipeline guarantees
// every column is non-null f64 by this point.
fn feature_rows(features: &DataFrame) -> Result<Vec<Vec<f32>>, FareError> {
    let mut rows: Vec<Vec<f32>> = (0..features.height())
        .map(|_| Vec::with_capacity(features.width()))
        .collect();
    for column in features.get_columns() {
        let values = column.f64()?;
        for (row, value) in rows.iter_mut().zip(values.into_no_null_iter()) {
            row.push(value as f32);
        }
    }
    Ok(rows)
}
