use crate::config::{Config, TRACKED_INSTRUMENTS};
use crate::errors::{Result, TrackerError};
use crate::models::growth::{DataSource, GrowthSnapshot, InstrumentConfig, PricePoint, TrackedInstrument};
use crate::scrapers::base::HistorySource;
use crate::scrapers::eastmoney::EastmoneyScraper;
use crate::services::fallback::FallbackGenerator;
use crate::services::growth::compute_growth;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 数据服务：并发抓取全部股票、计算涨幅，全部失败时回退到模拟数据
pub struct DataService {
    config: Config,
    source: Arc<dyn HistorySource + Send + Sync>,
    fallback: FallbackGenerator,
    generation: AtomicU64,
}

impl DataService {
    /// 创建新的数据服务实例
    pub fn new(config: Config, source: Arc<dyn HistorySource + Send + Sync>) -> Self {
        let fallback = FallbackGenerator::new(config.volatility);
        Self {
            config,
            source,
            fallback,
            generation: AtomicU64::new(0),
        }
    }

    /// 使用东方财富作为数据源；客户端创建失败时所有请求都会失败并走模拟数据
    pub fn eastmoney(config: Config) -> Self {
        let source: Arc<dyn HistorySource + Send + Sync> = match EastmoneyScraper::new(&config) {
            Ok(scraper) => Arc::new(scraper),
            Err(e) => {
                error!("Failed to build eastmoney client: {}", e);
                Arc::new(UnavailableSource(e.to_string()))
            }
        };
        Self::new(config, source)
    }

    /// 最近一次刷新使用的代次号
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 刷新全部股票数据。
    ///
    /// Returns real data when at least one instrument succeeded, otherwise a
    /// complete simulated set. Only fails when the simulation itself cannot
    /// run (no trading days between the baseline and today).
    pub async fn refresh(&self) -> Result<GrowthSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Refresh #{} for {} instruments via {}",
              generation, TRACKED_INSTRUMENTS.len(), self.source.source_name());

        let (instruments, source) = match require_any(self.fetch_all().await) {
            Ok(instruments) => (instruments, DataSource::Real),
            Err(e) => {
                error!("{}, falling back to simulated data", e);
                let simulated = self.fallback.generate(
                    TRACKED_INSTRUMENTS,
                    self.config.baseline_date,
                    util::beijing_today(),
                )?;
                (simulated, DataSource::Simulated)
            }
        };

        info!("Refresh #{} produced {} instruments ({:?})", generation, instruments.len(), source);
        Ok(GrowthSnapshot {
            instruments,
            source,
            refreshed_at: util::beijing_now(),
            generation,
        })
    }

    /// 并发抓取，按登记顺序返回成功的股票，失败的记录日志后丢弃
    pub async fn fetch_all(&self) -> Vec<TrackedInstrument> {
        let fetches: Vec<_> = TRACKED_INSTRUMENTS
            .iter()
            .map(|instrument| async move { (instrument, self.fetch_one(instrument).await) })
            .collect();
        let results: Vec<(&InstrumentConfig, Result<TrackedInstrument>)> =
            stream::iter(fetches)
                .buffered(self.config.max_concurrency)
                .collect()
                .await;

        let mut instruments = Vec::with_capacity(results.len());
        for (instrument, result) in results {
            match result {
                Ok(tracked) => instruments.push(tracked),
                Err(e) => warn!("Failed to fetch {} ({}): {}",
                                instrument.display_name, instrument.symbol, e),
            }
        }
        instruments
    }

    async fn fetch_one(&self, instrument: &InstrumentConfig) -> Result<TrackedInstrument> {
        let timeout = self.config.request_timeout;
        let points = tokio::time::timeout(
            timeout,
            self.source.fetch_history(instrument.symbol, &self.config.baseline_date),
        )
        .await
        .map_err(|_| TrackerError::Timeout(timeout))??;

        build_instrument(instrument, &points)
    }
}

/// 由原始价格序列构建追踪数据，空序列视为无数据
pub fn build_instrument(instrument: &InstrumentConfig, points: &[PricePoint]) -> Result<TrackedInstrument> {
    let history = compute_growth(points)?;
    let tracked = TrackedInstrument::from_history(instrument, history)
        .ok_or_else(|| TrackerError::EmptyResult(util::secid_for(instrument.symbol)))?;

    debug!("{} {} -> {:.2}% on {}", tracked.symbol, tracked.display_name,
           tracked.total_growth_pct, tracked.latest_date);
    Ok(tracked)
}

fn require_any(instruments: Vec<TrackedInstrument>) -> Result<Vec<TrackedInstrument>> {
    if instruments.is_empty() {
        Err(TrackerError::AllInstrumentsFailed(TRACKED_INSTRUMENTS.len()))
    } else {
        Ok(instruments)
    }
}

/// 数据源无法初始化时的占位实现
struct UnavailableSource(String);

#[async_trait]
impl HistorySource for UnavailableSource {
    fn source_name(&self) -> &'static str {
        "unavailable"
    }

    async fn fetch_history(&self, _symbol: &str, _start: &NaiveDate) -> Result<Vec<PricePoint>> {
        Err(TrackerError::Unknown(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use std::collections::HashMap;
    use std::time::Duration;

    enum Reply {
        Prices(Vec<f64>),
        Fail,
        Hang,
    }

    /// 内存数据源，未登记的代码返回错误
    struct MockSource {
        replies: HashMap<&'static str, Reply>,
    }

    impl MockSource {
        fn new(replies: Vec<(&'static str, Reply)>) -> Arc<Self> {
            Arc::new(Self { replies: replies.into_iter().collect() })
        }
    }

    #[async_trait]
    impl HistorySource for MockSource {
        fn source_name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_history(&self, symbol: &str, start: &NaiveDate) -> Result<Vec<PricePoint>> {
            match self.replies.get(symbol) {
                Some(Reply::Prices(prices)) => Ok(prices
                    .iter()
                    .enumerate()
                    .map(|(i, &price)| PricePoint {
                        date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                        price,
                    })
                    .collect()),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err("unreachable".into())
                }
                Some(Reply::Fail) | None => Err(TrackerError::EmptyResult(util::secid_for(symbol))),
            }
        }
    }

    fn service(source: Arc<MockSource>) -> DataService {
        DataService::new(
            Config::new().with_request_timeout(Duration::from_millis(200)),
            source,
        )
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes_in_order() {
        let source = MockSource::new(vec![
            ("600048", Reply::Prices(vec![10.0, 11.0])),
            ("601186", Reply::Prices(vec![1.0, 1.1, 1.21])),
            ("001979", Reply::Fail),
        ]);
        let snapshot = service(source).refresh().await.unwrap();

        assert_eq!(snapshot.source, DataSource::Real);
        let symbols: Vec<&str> = snapshot.instruments.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["601186", "600048"]);

        let railway = snapshot.get_by_symbol("601186").unwrap();
        assert_eq!(railway.total_growth_pct, 21.0);
        assert_eq!(railway.latest_price, 1.21);
        assert_eq!(railway.display_name, "中国铁建");
    }

    #[tokio::test]
    async fn test_empty_and_invalid_series_are_excluded() {
        let source = MockSource::new(vec![
            ("600048", Reply::Prices(vec![])),
            ("600585", Reply::Prices(vec![0.0, 1.0])),
            ("600887", Reply::Prices(vec![25.0])),
        ]);
        let snapshot = service(source).refresh().await.unwrap();

        assert_eq!(snapshot.source, DataSource::Real);
        assert_eq!(snapshot.instruments.len(), 1);
        assert_eq!(snapshot.instruments[0].symbol, "600887");
        assert_eq!(snapshot.instruments[0].total_growth_pct, 0.0);
    }

    #[tokio::test]
    async fn test_all_failed_falls_back_to_full_simulation() {
        let snapshot = service(MockSource::new(vec![])).refresh().await.unwrap();

        assert!(snapshot.is_simulated());
        assert_eq!(snapshot.instruments.len(), TRACKED_INSTRUMENTS.len());
        for tracked in &snapshot.instruments {
            assert_eq!(tracked.history[0].cumulative_growth_pct, 0.0);
            assert_eq!(tracked.history[0].date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        }
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let source = MockSource::new(vec![
            ("601088", Reply::Hang),
            ("601600", Reply::Prices(vec![4.0, 5.0])),
        ]);
        let snapshot = service(source).refresh().await.unwrap();

        assert_eq!(snapshot.source, DataSource::Real);
        assert_eq!(snapshot.instruments.len(), 1);
        assert_eq!(snapshot.instruments[0].total_growth_pct, 25.0);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_surfaced() {
        let future_baseline = util::beijing_today() + Days::new(30);
        let service = DataService::new(
            Config::new().with_baseline_date(future_baseline),
            MockSource::new(vec![]),
        );

        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, TrackerError::FallbackError(_)));
    }

    #[tokio::test]
    async fn test_consecutive_refreshes_are_identical() {
        let source = MockSource::new(vec![
            ("600690", Reply::Prices(vec![20.0, 21.5, 19.9])),
            ("601225", Reply::Prices(vec![18.0, 18.18])),
        ]);
        let service = service(source);

        let first = service.refresh().await.unwrap();
        let second = service.refresh().await.unwrap();

        assert_eq!(first.instruments, second.instruments);
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(service.current_generation(), 2);
    }

    #[tokio::test]
    async fn test_serial_fetch_with_concurrency_one() {
        let source = MockSource::new(vec![
            ("601390", Reply::Prices(vec![5.0, 5.5])),
            ("601600", Reply::Prices(vec![4.0, 3.0])),
        ]);
        let service = DataService::new(Config::new().with_max_concurrency(1), source);

        let instruments = service.fetch_all().await;
        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0].symbol, "601390");
        assert_eq!(instruments[1].total_growth_pct, -25.0);
    }

    #[test]
    fn test_build_instrument_rejects_empty() {
        let config = &TRACKED_INSTRUMENTS[2];
        assert!(matches!(
            build_instrument(config, &[]),
            Err(TrackerError::EmptyResult(secid)) if secid == "1.600048"
        ));
    }
}
