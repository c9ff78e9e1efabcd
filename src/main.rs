use taxi_fare_prediction::{evaluate, Config, FareModel, TripDataLoader, TripRecord};
use tracing::{debug, info, instrument};

#[instrument]
fn main() -> Result<(), taxi_fare_prediction::BoxError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting taxi fare prediction");

    let config_path = "config.toml";
    debug!("Loading config from path: {}", config_path);
    let config = Config::load(config_path)?;
    debug!(?config, "Config loaded successfully");

    let train_loader = TripDataLoader::new(&config.train_path)?;
    let test_loader = TripDataLoader::new(&config.test_path)?;

    let train_trips = train_loader.load()?;
    debug!(train_shape = ?train_trips.shape(), "Training trips loaded");
    let test_trips = test_loader.load()?;
    debug!(test_shape = ?test_trips.shape(), "Test trips loaded");

    let model = FareModel::fit(&train_trips, &config.model)?;
    let report = evaluate(&model, &test_trips)?;

    println!();
    println!("Test set metrics");
    println!("  R^2:  {:.4}", report.r_squared);
    println!("  RMSE: {:.4}", report.rmse);
    println!("  MAE:  {:.4}", report.mae);

    model.save(&config.model_path)?;
    info!(path = %config.model_path, "Model saved");

    // Reload from disk and score a single trip, the way a consumer of the
    // saved artifact would.
    let restored = FareModel::load(&config.model_path)?;
    let trip = TripRecord {
        vendor_id: "VTS".to_string(),
        rate_code: "1".to_string(),
        passenger_count: 1.0,
        trip_time_in_secs: 1140.0,
        trip_distance: 3.75,
        payment_type: "CRD".to_string(),
        fare_amount: 15.5,
    };
    let predicted = restored.predict_record(&trip)?;

    println!();
    println!("Single trip prediction (model reloaded from disk)");
    println!("  predicted fare: {:.2}", predicted);
    println!("  actual fare:    {:.2}", trip.fare_amount);

    info!("Run complete");
    Ok(())
}
