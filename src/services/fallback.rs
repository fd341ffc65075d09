use crate::errors::{Result, TrackerError};
use crate::models::growth::{InstrumentConfig, PricePoint, TrackedInstrument};
use crate::services::growth::compute_growth;
use crate::util::{self, round4};
use chrono::NaiveDate;
use log::{debug, warn};
use rand::Rng;

/// 模拟起始价格
const SEED_PRICE: f64 = 1.0;

/// 模拟数据生成器，仅在全部真实请求失败时整体使用
pub struct FallbackGenerator {
    volatility: f64,
}

impl FallbackGenerator {
    pub fn new(volatility: f64) -> Self {
        Self { volatility }
    }

    /// 为每只股票生成 [start, end] 工作日内的模拟走势，每次调用重新随机
    pub fn generate(
        &self,
        instruments: &[InstrumentConfig],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrackedInstrument>> {
        self.generate_with_rng(&mut rand::rng(), instruments, start, end)
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        rng: &mut R,
        instruments: &[InstrumentConfig],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrackedInstrument>> {
        let days = util::weekdays_between(start, end);
        if days.is_empty() {
            return Err(TrackerError::FallbackError(format!(
                "No trading days between {} and {}", start, end
            )));
        }
        debug!("Simulating {} instruments over {} trading days", instruments.len(), days.len());

        let mut result = Vec::with_capacity(instruments.len());
        for config in instruments {
            let prices = self.simulate_prices(rng, &days);
            let mut history = compute_growth(&prices)?;
            for observation in &mut history {
                observation.price = round4(observation.price);
            }

            match TrackedInstrument::from_history(config, history) {
                Some(tracked) => result.push(tracked),
                None => warn!("Empty simulated history for {}", config.symbol),
            }
        }

        Ok(result)
    }

    fn simulate_prices<R: Rng>(&self, rng: &mut R, days: &[NaiveDate]) -> Vec<PricePoint> {
        // 每只股票一个趋势项，略偏正
        let drift = (rng.random::<f64>() - 0.45) * 0.002;
        let mut price = SEED_PRICE;

        days.iter()
            .enumerate()
            .map(|(i, &date)| {
                if i > 0 {
                    let noise = (rng.random::<f64>() - 0.5) * 2.0 * self.volatility;
                    price *= 1.0 + noise + drift;
                }
                PricePoint { date, price }
            })
            .collect()
    }
}
