//! Meal photo scan command

use super::print_inline_error;
use super::tracking::announce_celebration;
use crate::app::App;
use crate::camera::{CameraSource, CapturePipeline, FileCameraSource};
use crate::error::Result;
use crate::gateway::AiGateway;
use crate::tracker::FoodItem;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Scan `image` and log whatever food the model identifies
pub async fn handle_scan(app: &App, image: PathBuf, dry_run: bool) -> Result<()> {
    let source = Arc::new(FileCameraSource::new(image, app.config.camera.max_dimension));
    let gateway = app.gateway();
    run_scan(app, source, &gateway, dry_run).await;
    Ok(())
}

/// Drive one capture pipeline to completion
///
/// Returns the items logged. Every failure is shown inline.
pub(crate) async fn run_scan(
    app: &App,
    source: Arc<dyn CameraSource>,
    gateway: &AiGateway,
    dry_run: bool,
) -> Vec<FoodItem> {
    let mut pipeline = CapturePipeline::new(source);

    if pipeline.open().await.is_err() {
        let message = pipeline.error().unwrap_or("Could not access the camera.");
        print_inline_error(message);
        pipeline.close();
        return Vec::new();
    }

    let captured = pipeline.capture().map(|frame| frame.len());
    if let Err(e) = captured {
        tracing::error!("Failed to capture photo: {}", e);
        print_inline_error(&format!("Could not capture a photo: {}", e));
        pipeline.close();
        return Vec::new();
    }

    println!("Analyzing meal...");
    let outcome = pipeline.analyze(gateway).await;

    if dry_run {
        match outcome {
            Ok(estimates) if estimates.is_empty() => {
                print_inline_error(crate::tracker::NO_FOOD_IDENTIFIED)
            }
            Ok(estimates) => {
                for estimate in estimates {
                    println!(
                        "  {} ~{} kcal",
                        estimate.name.trim(),
                        estimate.rounded_calories()
                    );
                }
            }
            Err(message) => print_inline_error(&message),
        }
        return Vec::new();
    }

    let added = app.tracker.record_scan(outcome);
    match app.tracker.scan_error() {
        Some(message) => print_inline_error(&message),
        None => {
            for item in &added {
                println!(
                    "{} {} ({} kcal)",
                    "Logged".green(),
                    item.name.bold(),
                    item.calories
                );
            }
            announce_celebration(&app.tracker);
        }
    }
    added
}
