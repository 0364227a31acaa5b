mod common;

use chrono::{Days, Local, NaiveDate};
use common::{StubResponse, StubServer};
use reservoir_monitor::{
    FeedConfig, FillStatus, LatLon, MonitorError, NominatimGeocoder, ReservoirMonitor,
    ReservoirRecord, ResolutionMethod, RiskLevel, SurveyOptions,
};
use std::time::Duration;

const CAMPINA_GRANDE: &str = include_str!("../fixtures/nominatim_campina_grande.json");

fn days_ago(days: u64) -> NaiveDate {
    Local::now().date_naive() - Days::new(days)
}

/// A readings document, oldest record first.
fn readings(records: &[(&str, NaiveDate)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?><ArrayOfReservatorio xmlns="http://sarws.ana.gov.br/">"#,
    );
    for (volume, date) in records {
        body.push_str(&format!(
            "<Reservatorio><VolumePercentual>{}</VolumePercentual><DataInformacao>{}</DataInformacao></Reservatorio>",
            volume,
            date.format("%d/%m/%Y")
        ));
    }
    body.push_str("</ArrayOfReservatorio>");
    body
}

async fn monitor(server: &StubServer) -> ReservoirMonitor {
    ReservoirMonitor::builder()
        .feed(FeedConfig::with_base_url(&server.base_url))
        .geocoder(NominatimGeocoder::with_base_url(&server.base_url))
        .build()
        .await
        .unwrap()
}

fn sar_requests(server: &StubServer) -> usize {
    server
        .requests()
        .iter()
        .filter(|r| r.path == "/DadosHistoricos")
        .count()
}

#[tokio::test]
async fn city_report_uses_the_override_and_latest_reading() {
    let server = StubServer::start(vec![
        ("/search", StubResponse::json(CAMPINA_GRANDE)),
        (
            "/DadosHistoricos?reservatorio=12306",
            StubResponse::xml(readings(&[
                ("18,9", days_ago(3)),
                ("18,4", days_ago(2)),
                ("", days_ago(1)),
            ])),
        ),
    ])
    .await;
    let monitor = monitor(&server).await;

    let report = monitor
        .report_for_city(" Campina Grande ")
        .await
        .unwrap()
        .expect("city should be found");

    assert_eq!(report.city, "Campina Grande");
    assert_eq!(report.place.location, LatLon(-7.2306, -35.8811));
    assert_eq!(report.reservoir().name, "Epitácio Pessoa (Boqueirão) (PB)");
    assert_eq!(report.resolution.method, ResolutionMethod::Override);
    assert_eq!(report.resolution.distance_km, 0.0);

    let reading = report.reading.clone().expect("a reading");
    assert_eq!(reading.volume_percent, 18.4);
    assert_eq!(reading.measured_on, days_ago(2));
    assert_eq!(report.status(), Some(FillStatus::Critical));
    assert!(report.is_low(20.0));

    let geocode = server
        .requests()
        .into_iter()
        .find(|r| r.path == "/search")
        .unwrap();
    assert_eq!(geocode.query["q"], "Campina Grande, Brazil");
    assert_eq!(geocode.query["format"], "json");
    assert_eq!(geocode.query["limit"], "1");
}

#[tokio::test]
async fn repeated_reports_reuse_the_reading() {
    let server = StubServer::start(vec![
        ("/search", StubResponse::json(CAMPINA_GRANDE)),
        (
            "/DadosHistoricos",
            StubResponse::xml(readings(&[("61,0", days_ago(1))])),
        ),
    ])
    .await;
    let monitor = monitor(&server).await;

    for _ in 0..3 {
        let report = monitor.report_for_city("Campina Grande").await.unwrap().unwrap();
        assert_eq!(report.status(), Some(FillStatus::Comfortable));
    }
    assert_eq!(sar_requests(&server), 1);
}

#[tokio::test]
async fn zero_ttl_disables_the_reading_cache() {
    let server = StubServer::start(vec![(
        "/DadosHistoricos",
        StubResponse::xml(readings(&[("61,0", days_ago(1))])),
    )])
    .await;
    let monitor = ReservoirMonitor::builder()
        .feed(FeedConfig::with_base_url(&server.base_url))
        .reading_ttl(Duration::ZERO)
        .build()
        .await
        .unwrap();
    let reservoir = monitor.reservoirs()[0].clone();

    for _ in 0..2 {
        assert!(monitor.latest_reading().reservoir(&reservoir).call().await.is_some());
    }
    assert_eq!(sar_requests(&server), 2);
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = StubServer::start(vec![("/search", StubResponse::json("[]"))]).await;
    let monitor = monitor(&server).await;

    assert!(monitor.report_for_city("Atlântida").await.unwrap().is_none());
    assert_eq!(sar_requests(&server), 0);
}

#[tokio::test]
async fn geocoder_failure_is_an_error() {
    let server = StubServer::start(vec![("/search", StubResponse::status(503))]).await;
    let monitor = monitor(&server).await;

    assert!(matches!(
        monitor.report_for_city("Recife").await,
        Err(MonitorError::Geocode(_))
    ));
}

#[tokio::test]
async fn unavailable_feed_still_reports_the_reservoir() {
    let server = StubServer::start(vec![
        ("/search", StubResponse::json(CAMPINA_GRANDE)),
        ("/DadosHistoricos", StubResponse::status(500)),
    ])
    .await;
    let monitor = monitor(&server).await;

    let report = monitor.report_for_city("Campina Grande").await.unwrap().unwrap();
    assert_eq!(report.reservoir().external_id, "12306");
    assert_eq!(report.reading, None);
    assert_eq!(report.status(), None);
}

#[tokio::test]
async fn stale_readings_are_unavailable() {
    let server = StubServer::start(vec![(
        "/DadosHistoricos",
        StubResponse::xml(readings(&[("50,0", days_ago(40))])),
    )])
    .await;
    let monitor = monitor(&server).await;
    let reservoir = monitor.reservoirs()[0].clone();

    let recent_only = monitor
        .latest_reading()
        .reservoir(&reservoir)
        .lookback_days(30)
        .call()
        .await;
    assert_eq!(recent_only, None);

    let reading = monitor
        .latest_reading()
        .reservoir(&reservoir)
        .lookback_days(60)
        .call()
        .await
        .expect("within the longer window");
    assert_eq!(reading.volume_percent, 50.0);
}

#[tokio::test]
async fn survey_keeps_order_and_skips_unavailable_reservoirs() {
    let reservoirs = vec![
        ReservoirRecord::new("Cantareira", "1", LatLon(-23.15, -46.38), "SP"),
        ReservoirRecord::new("Billings", "2", LatLon(-23.78, -46.63), "SP"),
        ReservoirRecord::new("Castanhão", "3", LatLon(-5.5, -38.47), "CE"),
        ReservoirRecord::new("Orós", "4", LatLon(-6.24, -38.91), "CE"),
    ];
    let server = StubServer::start(vec![
        (
            "/DadosHistoricos?reservatorio=1",
            StubResponse::xml(readings(&[("42,5", days_ago(1))])),
        ),
        ("/DadosHistoricos?reservatorio=2", StubResponse::status(500)),
        (
            // Answers slower than reservoir 4, but must stay ahead of it.
            "/DadosHistoricos?reservatorio=3",
            StubResponse::xml(readings(&[("15,5", days_ago(2))]))
                .delayed(Duration::from_millis(300)),
        ),
        (
            "/DadosHistoricos?reservatorio=4",
            StubResponse::xml(readings(&[("31,0", days_ago(1))])),
        ),
    ])
    .await;
    let monitor = ReservoirMonitor::builder()
        .reservoirs(reservoirs)
        .feed(FeedConfig::with_base_url(&server.base_url))
        .survey_options(SurveyOptions {
            concurrency: 4,
            ..SurveyOptions::default()
        })
        .build()
        .await
        .unwrap();

    let panorama = monitor.survey().await;

    let names: Vec<_> = panorama
        .snapshots
        .iter()
        .map(|s| s.reservoir.name.as_str())
        .collect();
    assert_eq!(names, ["Cantareira", "Castanhão", "Orós"]);
    let risks: Vec<_> = panorama.snapshots.iter().map(|s| s.risk).collect();
    assert_eq!(
        risks,
        [RiskLevel::Normal, RiskLevel::Critical, RiskLevel::Attention]
    );
    assert_eq!(panorama.surveyed, 4);
    assert_eq!(panorama.monitored(), 3);
    assert_eq!(panorama.critical_count(), 1);
    let mean = panorama.mean_volume().unwrap();
    assert!((mean - 29.666_666).abs() < 1e-3);

    let windows: Vec<_> = server
        .requests()
        .into_iter()
        .map(|r| r.query["dataInicial"].clone())
        .collect();
    let expected_start = days_ago(90).format("%d/%m/%Y").to_string();
    assert!(windows.iter().all(|start| *start == expected_start));
}

#[tokio::test]
async fn full_catalog_is_cached_in_the_cache_folder() {
    let server = StubServer::start(vec![(
        "/ListaReservatorios",
        StubResponse::xml(include_str!("../fixtures/catalog.xml")),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let monitor = ReservoirMonitor::builder()
        .feed(FeedConfig::with_base_url(&server.base_url))
        .cache_folder(dir.path().join("cache"))
        .build()
        .await
        .unwrap();

    assert_eq!(monitor.full_catalog().await.len(), 3);
    assert_eq!(monitor.full_catalog().await.len(), 3);
    assert_eq!(server.hits(), 1);
}
