use crate::error::FareError;
use crate::model::FareModel;
use polars::prelude::*;
use tracing::debug;

/// Regression quality summary for one prediction batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionReport {
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl RegressionReport {
    /// Compute the report from paired predictions and observed fares.
    ///
    /// `r_squared` is NaN when the observed fares have zero variance, since
    /// explained variance is undefined there. An empty batch reports NaN
    /// `r_squared` and zero error terms.
    pub fn from_pairs(predicted: &[f32], actual: &[f32]) -> Self {
        debug_assert_eq!(predicted.len(), actual.len());
        let count = predicted.len().min(actual.len());
        if count == 0 {
            return Self {
                r_squared: f64::NAN,
                rmse: 0.0,
                mae: 0.0,
            };
        }

        // Accumulate in f64 to keep the sums stable on larger batches.
        let n = count as f64;
        let mean_actual = actual[..count].iter().map(|&a| f64::from(a)).sum::<f64>() / n;
        let mut ss_residual = 0.0;
        let mut ss_total = 0.0;
        let mut abs_error_sum = 0.0;
        for (&p, &a) in predicted[..count].iter().zip(&actual[..count]) {
            let error = f64::from(a) - f64::from(p);
            let spread = f64::from(a) - mean_actual;
            ss_residual += error * error;
            ss_total += spread * spread;
            abs_error_sum += error.abs();
        }

        let r_squared = if ss_total == 0.0 {
            f64::NAN
        } else {
            1.0 - ss_residual / ss_total
        };
        Self {
            r_squared,
            rmse: (ss_residual / n).sqrt(),
            mae: abs_error_sum / n,
        }
    }
}

/// Score a trained model against a raw trip frame with observed fares.
pub fn evaluate(model: &FareModel, frame: &DataFrame) -> Result<RegressionReport, FareError> {
    let predictions = model.predict(frame)?;
    let labels = model.pipeline().labels(frame)?;
    let actuals: Vec<f32> = labels.f64()?.into_no_null_iter().map(|v| v as f32).collect();
    let report = RegressionReport::from_pairs(&predictions, &actuals);
    debug!(?report, rows = predictions.len(), "Evaluation complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions_score_one() {
        let values = [4.0_f32, 8.0, 15.0, 16.0, 23.0];
        let report = RegressionReport::from_pairs(&values, &values);
        assert!((report.r_squared - 1.0).abs() < 1e-12);
        assert!(report.rmse.abs() < 1e-12);
        assert!(report.mae.abs() < 1e-12);
    }

    #[test]
    fn test_report_matches_hand_computed_values() {
        let actual = [1.0_f32, 2.0, 3.0];
        let predicted = [1.0_f32, 2.0, 4.0];
        let report = RegressionReport::from_pairs(&predicted, &actual);
        // mean = 2, ss_total = 2, ss_residual = 1
        assert!((report.r_squared - 0.5).abs() < 1e-9);
        assert!((report.rmse - (1.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((report.mae - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_actuals_yield_nan_r_squared() {
        let actual = [5.0_f32, 5.0, 5.0];
        let predicted = [4.0_f32, 5.0, 6.0];
        let report = RegressionReport::from_pairs(&predicted, &actual);
        assert!(report.r_squared.is_nan());
        assert!((report.rmse - (2.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((report.mae - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch_reports_nan_r_squared() {
        let report = RegressionReport::from_pairs(&[], &[]);
        assert!(report.r_squared.is_nan());
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mae, 0.0);
    }
}
