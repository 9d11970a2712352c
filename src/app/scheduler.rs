use crate::core::solar::SolarService;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Minute of every hour at which the model is refreshed.
pub const RUN_MINUTE: u32 = 50;

/// First instant strictly after `now` whose site-local minute is `minute`.
/// Wall-clock slots skipped by a DST switch are passed over.
pub fn next_run_after(now: &DateTime<Tz>, minute: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let local = now.naive_local();
    let slot = NaiveTime::from_hms_opt(local.hour(), minute.min(59), 0).unwrap_or(NaiveTime::MIN);

    let mut candidate = local.date().and_time(slot);
    loop {
        if let Some(at) = tz.from_local_datetime(&candidate).earliest() {
            if at > *now {
                return at;
            }
        }
        candidate += Duration::hours(1);
    }
}

/// Hourly model refresh, stopped through a shutdown signal.
pub struct ModelScheduler {
    solar: Arc<SolarService>,
    minute: u32,
}

impl ModelScheduler {
    pub fn new(solar: Arc<SolarService>) -> Self {
        Self {
            solar,
            minute: RUN_MINUTE,
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let now = Utc::now().with_timezone(&self.solar.timezone());
            let next = next_run_after(&now, self.minute);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!("Next model run at {}", next);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    if let Err(e) = self.solar.run_model(None, None).await {
                        tracing::error!(
                            "❌ Scheduled model run failed: {} (Category: {:?}, Severity: {:?})",
                            e,
                            e.category(),
                            e.severity()
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Scheduler stopped");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Brussels;

    fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<Tz> {
        Brussels.with_ymd_and_hms(2024, 6, day, h, m, s).unwrap()
    }

    #[test]
    fn test_next_run_in_same_hour() {
        assert_eq!(next_run_after(&at(1, 10, 12, 30), 50), at(1, 10, 50, 0));
    }

    #[test]
    fn test_next_run_rolls_over_hour_and_day() {
        assert_eq!(next_run_after(&at(1, 10, 50, 0), 50), at(1, 11, 50, 0));
        assert_eq!(next_run_after(&at(1, 10, 55, 0), 50), at(1, 11, 50, 0));
        assert_eq!(next_run_after(&at(1, 23, 51, 0), 50), at(2, 0, 50, 0));
    }

    #[test]
    fn test_next_run_across_dst_gap() {
        // 02:00..03:00 does not exist on 2024-03-31 in Brussels
        let now = Brussels.with_ymd_and_hms(2024, 3, 31, 1, 55, 0).unwrap();
        let next = next_run_after(&now, 50);
        assert_eq!(next, Brussels.with_ymd_and_hms(2024, 3, 31, 3, 50, 0).unwrap());
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        use crate::core::model::ModelChain;
        use crate::core::weather::WeatherService;
        use crate::adapters::openmeteo::OpenMeteoClient;
        use crate::domain::model::{Location, SolarInverter, SolarPanel};

        let location = Location {
            latitude: 50.85,
            longitude: 4.35,
            altitude: 60.0,
            timezone: Brussels,
        };
        let weather = Arc::new(WeatherService::new(
            Arc::new(OpenMeteoClient::new("http://127.0.0.1:9")),
            location.clone(),
        ));
        let chain = ModelChain::new(location, Vec::new(), SolarPanel::default(), SolarInverter::default());
        let solar = Arc::new(SolarService::new(chain, weather));

        let (tx, rx) = watch::channel(false);
        let handle = ModelScheduler::new(solar).spawn(rx);
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
