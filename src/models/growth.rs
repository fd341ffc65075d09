use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// 追踪标的配置（代码 + 显示名称）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentConfig {
    pub symbol: &'static str,
    pub display_name: &'static str,
}

/// 原始收盘价记录，来自K线接口
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// 日线涨幅数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub price: f64,
    pub daily_growth_pct: f64,      // 相对前一交易日
    pub cumulative_growth_pct: f64, // 相对基准日首个价格
}

/// Tracked instrument with its growth history since the baseline date.
///
/// The `latest_*` fields and `total_growth_pct` mirror the last element of
/// `history`; use [`TrackedInstrument::from_history`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedInstrument {
    pub symbol: String,
    pub display_name: String,
    pub history: Vec<DailyObservation>,
    pub latest_price: f64,
    pub latest_date: NaiveDate,
    pub total_growth_pct: f64,
}

impl TrackedInstrument {
    /// Returns `None` for an empty history.
    pub fn from_history(config: &InstrumentConfig, history: Vec<DailyObservation>) -> Option<Self> {
        let latest = history.last()?.clone();
        Some(Self {
            symbol: config.symbol.to_string(),
            display_name: config.display_name.to_string(),
            history,
            latest_price: latest.price,
            latest_date: latest.date,
            total_growth_pct: latest.cumulative_growth_pct,
        })
    }
}

/// 数据来源：真实行情或模拟数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Real,
    Simulated,
}

/// 一次刷新的完整结果，交给展示层后不可变
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSnapshot {
    pub instruments: Vec<TrackedInstrument>,
    pub source: DataSource,
    pub refreshed_at: DateTime<FixedOffset>,
    pub generation: u64,
}

impl GrowthSnapshot {
    pub fn is_simulated(&self) -> bool {
        self.source == DataSource::Simulated
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<&TrackedInstrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    /// 按累计涨幅从高到低排序（展示用）
    pub fn ranked(&self) -> Vec<&TrackedInstrument> {
        let mut ranked: Vec<&TrackedInstrument> = self.instruments.iter().collect();
        ranked.sort_by(|a, b| b.total_growth_pct.total_cmp(&a.total_growth_pct));
        ranked
    }
}
