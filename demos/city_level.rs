use reservoir_monitor::{MonitorError, ReservoirMonitor, DEFAULT_LOW_LEVEL_THRESHOLD};
use std::env;

#[tokio::main]
async fn main() -> Result<(), MonitorError> {
    // RUST_LOG=info (or debug) shows what the monitor is doing.
    env_logger::init();

    let city = env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let city = if city.trim().is_empty() {
        "Campina Grande".to_string()
    } else {
        city
    };

    let monitor = ReservoirMonitor::with_default_cache().await?;
    let Some(report) = monitor.report_for_city(&city).await? else {
        println!("City '{}' not found.", city);
        return Ok(());
    };

    println!("{}", report.place.address);
    println!(
        "Reference reservoir: {} ({:?}, {:.1} km)",
        report.reservoir().name,
        report.resolution.method,
        report.resolution.distance_km
    );
    match (&report.reading, report.status()) {
        (Some(reading), Some(status)) => {
            println!("Latest reading: {} [{}]", reading, status);
            if report.is_low(DEFAULT_LOW_LEVEL_THRESHOLD) {
                println!("Level is low, save water.");
            }
        }
        _ => println!("Telemetry unavailable for this reservoir."),
    }

    Ok(())
}
