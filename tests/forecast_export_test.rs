mod common;

use anyhow::Result;
use common::{date, solar_service};
use mme_soleil::app::export::export_forecast;
use mme_soleil::domain::ports::Storage;
use mme_soleil::LocalStorage;

#[tokio::test]
async fn test_forecast_export_covers_whole_days() -> Result<()> {
    let solar = solar_service();
    let csv = export_forecast(&solar, date(21), 1).await?;
    let text = String::from_utf8(csv)?;

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "time,ac_w,energy_wh");
    // header plus 24 hours of five-minute rows, both midnights included
    assert_eq!(lines.len(), 1 + 24 * 12 + 1);
    assert!(lines[1].starts_with("2024-06-21T00:00:00+02:00,0.0,"));
    assert!(lines.last().unwrap_or(&"").starts_with("2024-06-22T00:00:00+02:00"));
    Ok(())
}

#[tokio::test]
async fn test_forecast_export_written_to_storage() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    let solar = solar_service();
    let csv = export_forecast(&solar, date(21), 2).await?;
    storage.write_file("exports/forecast.csv", &csv).await?;

    let written = std::fs::read(dir.path().join("exports/forecast.csv"))?;
    assert_eq!(written, csv);

    let mut reader = csv::Reader::from_reader(written.as_slice());
    let energy: f64 = reader
        .records()
        .filter_map(|record| record.ok())
        .filter_map(|record| record.get(2).and_then(|wh| wh.parse::<f64>().ok()))
        .sum();
    // two June days of a 4.4 kWp site under light haze
    assert!(energy > 10_000.0, "forecast energy {} Wh", energy);
    Ok(())
}
