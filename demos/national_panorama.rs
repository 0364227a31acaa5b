use reservoir_monitor::{MonitorError, ReservoirMonitor};

#[tokio::main]
async fn main() -> Result<(), MonitorError> {
    env_logger::init();

    let monitor = ReservoirMonitor::with_default_cache().await?;
    let panorama = monitor.survey().await;

    for snapshot in &panorama.snapshots {
        println!(
            "{:<36} {:>7.2}%  {:<10} {}",
            snapshot.reservoir.name,
            snapshot.reading.volume_percent,
            snapshot.risk,
            snapshot.reading.measurement_date()
        );
    }
    println!(
        "\n{} of {} reservoirs reporting, {} critical",
        panorama.monitored(),
        panorama.surveyed,
        panorama.critical_count()
    );
    if let Some(mean) = panorama.mean_volume() {
        println!("Mean fill level: {:.1}%", mean);
    }

    let catalog = monitor.full_catalog().await;
    println!("{} reservoirs in the full registry", catalog.len());

    Ok(())
}
