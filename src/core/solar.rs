use crate::core::model::{time_grid, ModelChain};
use crate::core::production::{
    clamp_power, daily_cumulative_kwh, daily_kwh, hourly_kwh, production_bounds, production_wh,
    select_peak, PeakQuery,
};
use crate::core::weather::WeatherService;
use crate::domain::model::{
    ModelResults, PeakOrder, ProductionWeather, ResultSet, TimeSeries, WeatherSample,
};
use crate::utils::error::{Result, SoleilError};
use crate::utils::time::{day_end, day_start};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Days modelled past the start date when no end date is given.
pub const DEFAULT_FORECAST_DAYS: i64 = 3;

/// Seconds per model step, used to turn a peak duration into a window length.
const STEP_SECONDS: i64 = 300;

/// Production queries over the latest model runs.
pub struct SolarService {
    chain: ModelChain,
    weather: Arc<WeatherService>,
    results: RwLock<ModelResults>,
    results_clearsky: RwLock<ModelResults>,
}

impl SolarService {
    pub fn new(chain: ModelChain, weather: Arc<WeatherService>) -> Self {
        Self {
            chain,
            weather,
            results: RwLock::new(ModelResults::Undefined),
            results_clearsky: RwLock::new(ModelResults::Undefined),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.chain.location().timezone
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone())
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    pub fn weather(&self) -> &Arc<WeatherService> {
        &self.weather
    }

    /// Recomputes the clear-sky and weather-based results from `start_date`
    /// 00:00 up to `end_date` 00:00.
    ///
    /// When the forecast cannot be fetched the previous weather-based results
    /// stay in place.
    pub async fn run_model(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<()> {
        let start_date = start_date.unwrap_or_else(|| self.today());
        let end_date = end_date.unwrap_or(start_date + Duration::days(DEFAULT_FORECAST_DAYS));
        if end_date < start_date {
            return Err(SoleilError::validation(
                "end_date should be greater than or equal to start_date",
            ));
        }

        let tz = self.timezone();
        let grid = time_grid(day_start(&tz, start_date), day_start(&tz, end_date));
        tracing::info!(
            "Running model from {} to {} ({} instants)",
            start_date,
            end_date,
            grid.len()
        );

        let clearsky = self.chain.clearsky(&grid);
        let ac_clearsky = self.run_chain(clearsky).await?;
        *self.results_clearsky.write().await = ModelResults::Computed(ac_clearsky);

        match self.weather.get_weather(start_date, end_date).await {
            Ok(weather) => {
                let ac = self.run_chain(weather).await?;
                *self.results.write().await = ModelResults::Computed(ac);
                tracing::info!("✅ Model results updated");
            }
            Err(SoleilError::WeatherApi(e)) => {
                tracing::warn!("Weather forecast unavailable, keeping previous results: {}", e);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn run_chain(&self, weather: TimeSeries<WeatherSample>) -> Result<TimeSeries<f64>> {
        let chain = self.chain.clone();
        tokio::task::spawn_blocking(move || chain.run(&weather))
            .await
            .map_err(|e| SoleilError::processing(format!("Model run did not complete: {}", e)))
    }

    async fn results(&self, set: ResultSet) -> Result<TimeSeries<f64>> {
        let guard = match set {
            ResultSet::Weather => self.results.read().await,
            ResultSet::ClearSky => self.results_clearsky.read().await,
        };
        match &*guard {
            ModelResults::Computed(ac) => Ok(ac.clone()),
            ModelResults::Undefined => Err(SoleilError::ModelUnavailable),
        }
    }

    /// AC power in W within `[start, end]`, clamped to what the inverter can deliver.
    pub async fn get_ac_power(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        set: ResultSet,
    ) -> Result<TimeSeries<f64>> {
        let ac = self.results(set).await?;
        Ok(clamp_power(&ac.slice(start, end), self.chain.inverter().paco))
    }

    pub async fn get_production_wh(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        set: ResultSet,
    ) -> Result<TimeSeries<f64>> {
        let ac = self.get_ac_power(start, end, set).await?;
        Ok(production_wh(&ac))
    }

    async fn whole_days_wh(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> Result<TimeSeries<f64>> {
        let tz = self.timezone();
        let from = day_start(&tz, start.date_naive());
        let to = day_end(&tz, end.date_naive());
        self.get_production_wh(&from, &to, ResultSet::Weather).await
    }

    pub async fn get_daily_cumulative_kwh(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<TimeSeries<f64>> {
        let wh = self.whole_days_wh(start, end).await?;
        Ok(daily_cumulative_kwh(&wh).slice(start, end))
    }

    /// Hours with production, in kWh.
    pub async fn get_hourly_production_kwh(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<TimeSeries<f64>> {
        let wh = self.whole_days_wh(start, end).await?;
        let producing = hourly_kwh(&wh)
            .into_points()
            .into_iter()
            .filter(|(_, kwh)| *kwh > 0.0)
            .collect();
        Ok(TimeSeries::new(producing).slice(start, end))
    }

    pub async fn get_daily_production_kwh(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<TimeSeries<f64>> {
        let wh = self.whole_days_wh(start, end).await?;
        Ok(daily_kwh(&wh))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn get_production_peak(
        &self,
        end: &DateTime<Tz>,
        peak_duration: Duration,
        order: PeakOrder,
        precision: i32,
        start: Option<DateTime<Tz>>,
        min_kwh: Option<f64>,
        min_temp: Option<f64>,
    ) -> Result<DateTime<Tz>> {
        let start = start.unwrap_or_else(|| self.now());
        if *end <= start {
            return Err(SoleilError::validation("end should be greater than start"));
        }

        let window = usize::try_from(peak_duration.num_seconds() / STEP_SECONDS).unwrap_or(0);
        if window == 0 {
            return Err(SoleilError::validation(
                "peak duration should be at least 5 minutes",
            ));
        }

        let until = end
            .checked_add_signed(peak_duration)
            .ok_or_else(|| SoleilError::validation("peak duration is out of range"))?;

        let wh = self
            .get_production_wh(&start, &until, ResultSet::Weather)
            .await?;
        let temperature = self.weather.temperature().await?;

        let query = PeakQuery {
            window,
            order,
            precision,
            min_kwh,
            min_temp,
        };
        select_peak(&wh, &temperature, &query).ok_or(SoleilError::NoData)
    }

    /// First and last instant of `date` producing more than `min_kw`.
    pub async fn get_production_bounds(
        &self,
        date: NaiveDate,
        min_kw: f64,
    ) -> Result<(Option<DateTime<Tz>>, Option<DateTime<Tz>>)> {
        let tz = self.timezone();
        let ac = self
            .get_ac_power(&day_start(&tz, date), &day_end(&tz, date), ResultSet::Weather)
            .await?;
        Ok(production_bounds(&ac, min_kw))
    }

    /// Forecast energy against clear-sky energy over `[start, end]`.
    pub async fn get_production_weather(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<ProductionWeather> {
        let total_kwh = |wh: TimeSeries<f64>| wh.iter().map(|(_, e)| e).sum::<f64>() / 1000.0;

        let weather_data = total_kwh(self.get_production_wh(start, end, ResultSet::Weather).await?);
        let clearsky = total_kwh(self.get_production_wh(start, end, ResultSet::ClearSky).await?);
        let ratio = if clearsky == 0.0 { 0.0 } else { weather_data / clearsky };

        Ok(ProductionWeather {
            weather_data,
            clearsky,
            ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ArrayMount, Location, SolarInverter, SolarPanel};
    use crate::domain::ports::WeatherProvider;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use chrono_tz::Europe::Brussels;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn location() -> Location {
        Location {
            latitude: 50.85,
            longitude: 4.35,
            altitude: 60.0,
            timezone: Brussels,
        }
    }

    fn chain() -> ModelChain {
        ModelChain::new(
            location(),
            vec![
                ArrayMount {
                    tilt: 35.0,
                    azimuth: 180.0,
                    height: 6.0,
                    modules_per_string: 6,
                },
                ArrayMount {
                    tilt: 35.0,
                    azimuth: 270.0,
                    height: 6.0,
                    modules_per_string: 5,
                },
            ],
            SolarPanel::default(),
            SolarInverter::default(),
        )
    }

    /// Hazy clear sky at 18 °C, or a transport error when `failing` is set.
    struct HazyWeather {
        failing: AtomicBool,
    }

    #[async_trait]
    impl WeatherProvider for HazyWeather {
        async fn fetch_weather(
            &self,
            location: &Location,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<TimeSeries<WeatherSample>> {
            if self.failing.load(Ordering::SeqCst) {
                reqwest::get("not a url").await?;
            }
            let grid = time_grid(
                day_start(&location.timezone, start_date),
                day_start(&location.timezone, end_date),
            );
            Ok(chain().clearsky(&grid).map(|sky| WeatherSample {
                ghi: sky.ghi * 0.8,
                dni: sky.dni * 0.8,
                dhi: sky.dhi * 0.8,
                temp_air: Some(18.0),
                wind_speed: Some(2.0),
            }))
        }
    }

    fn service() -> (SolarService, Arc<HazyWeather>) {
        let provider = Arc::new(HazyWeather {
            failing: AtomicBool::new(false),
        });
        let weather = Arc::new(WeatherService::new(provider.clone(), location()));
        (SolarService::new(chain(), weather), provider)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Tz> {
        Brussels.with_ymd_and_hms(2024, 6, day, h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_queries_before_first_run_are_unavailable() {
        let (service, _) = service();
        let result = service
            .get_ac_power(&at(21, 0, 0), &at(21, 23, 0), ResultSet::Weather)
            .await;
        assert!(matches!(result, Err(SoleilError::ModelUnavailable)));
    }

    #[tokio::test]
    async fn test_run_model_rejects_reversed_dates() {
        let (service, _) = service();
        let result = service.run_model(Some(date(22)), Some(date(21))).await;
        assert!(matches!(result, Err(SoleilError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_run_model_and_production_queries() {
        let (service, _) = service();
        service.run_model(Some(date(21)), Some(date(23))).await.unwrap();

        let ac = service
            .get_ac_power(&at(21, 0, 0), &at(23, 0, 0), ResultSet::Weather)
            .await
            .unwrap();
        assert_eq!(ac.len(), 2 * 24 * 12 + 1);
        assert!(ac.iter().all(|(_, w)| (0.0..=5000.0).contains(w)));

        let daily = service
            .get_daily_production_kwh(&at(21, 0, 0), &at(22, 12, 0))
            .await
            .unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily.points()[0].0, at(21, 0, 0));
        assert!(daily.points()[0].1 > 10.0, "daily kWh {}", daily.points()[0].1);

        let cumulative = service
            .get_daily_cumulative_kwh(&at(21, 0, 0), &at(21, 23, 55))
            .await
            .unwrap();
        let last = cumulative.points().last().unwrap().1;
        assert!((last - daily.points()[0].1).abs() < 1e-6);

        let hourly = service
            .get_hourly_production_kwh(&at(21, 0, 0), &at(21, 23, 0))
            .await
            .unwrap();
        assert!(hourly.iter().all(|(_, kwh)| *kwh > 0.0));
        let hourly_total: f64 = hourly.iter().map(|(_, kwh)| kwh).sum();
        assert!((hourly_total - daily.points()[0].1).abs() < 1e-6);

        let (first, last) = service.get_production_bounds(date(21), 0.0).await.unwrap();
        let (first, last) = (first.unwrap(), last.unwrap());
        assert!(first < at(21, 7, 0) && last > at(21, 20, 0));

        let ratio = service
            .get_production_weather(&at(21, 0, 0), &at(21, 23, 55))
            .await
            .unwrap();
        assert!(ratio.weather_data < ratio.clearsky);
        assert!(ratio.ratio > 0.5 && ratio.ratio < 1.0, "ratio {}", ratio.ratio);
    }

    #[tokio::test]
    async fn test_peak_is_around_midday() {
        let (service, _) = service();
        service.run_model(Some(date(21)), Some(date(23))).await.unwrap();

        let peak = service
            .get_production_peak(
                &at(21, 20, 0),
                Duration::hours(2),
                PeakOrder::First,
                1,
                Some(at(21, 6, 0)),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(peak > at(21, 10, 0) && peak < at(21, 16, 0), "peak {}", peak);

        let reversed = service
            .get_production_peak(
                &at(21, 6, 0),
                Duration::hours(2),
                PeakOrder::First,
                1,
                Some(at(21, 20, 0)),
                None,
                None,
            )
            .await;
        assert!(matches!(reversed, Err(SoleilError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_peak_duration_past_calendar_range() {
        let (service, _) = service();
        service.run_model(Some(date(21)), Some(date(22))).await.unwrap();

        let result = service
            .get_production_peak(
                &at(21, 20, 0),
                Duration::try_hours(2_550_000_000).unwrap(),
                PeakOrder::First,
                1,
                Some(at(21, 6, 0)),
                None,
                None,
            )
            .await;
        assert!(matches!(result, Err(SoleilError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_failed_forecast_keeps_previous_results() {
        let (service, provider) = service();
        service.run_model(Some(date(21)), Some(date(22))).await.unwrap();

        provider.failing.store(true, Ordering::SeqCst);
        service.run_model(Some(date(24)), Some(date(25))).await.unwrap();

        // weather results still cover the first run, clear sky moved on
        let kept = service
            .get_ac_power(&at(21, 12, 0), &at(21, 12, 0), ResultSet::Weather)
            .await
            .unwrap();
        assert_eq!(kept.len(), 1);
        let cleared = service
            .get_ac_power(&at(21, 12, 0), &at(21, 12, 0), ResultSet::ClearSky)
            .await
            .unwrap();
        assert!(cleared.is_empty());
    }
}
