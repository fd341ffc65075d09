use log::{debug, info};
use std::sync::RwLock;

use crate::models::growth::{GrowthSnapshot, TrackedInstrument};

/// 快照提供者，保存最近一次应用的刷新结果。
///
/// Refreshes may overlap; each snapshot carries the generation it was started
/// with and is only applied when newer than what is currently held, so a slow
/// earlier refresh can never overwrite a later one.
pub struct SnapshotProvider {
    current: RwLock<Option<GrowthSnapshot>>,
}

impl SnapshotProvider {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// 应用新快照，返回是否被采用
    pub fn apply(&self, snapshot: GrowthSnapshot) -> bool {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());

        if let Some(held) = current.as_ref() {
            if snapshot.generation <= held.generation {
                debug!("Discarding stale snapshot #{} (holding #{})",
                       snapshot.generation, held.generation);
                return false;
            }
        }

        info!("Applied snapshot #{} with {} instruments ({:?})",
              snapshot.generation, snapshot.instruments.len(), snapshot.source);
        *current = Some(snapshot);
        true
    }

    /// 获取当前快照的副本
    pub fn latest(&self) -> Option<GrowthSnapshot> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn latest_generation(&self) -> Option<u64> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.generation)
    }

    /// 获取指定股票
    pub fn get_by_symbol(&self, symbol: &str) -> Option<TrackedInstrument> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .and_then(|s| s.get_by_symbol(symbol).cloned())
    }
}

impl Default for SnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::growth::{DailyObservation, DataSource, InstrumentConfig};
    use chrono::NaiveDate;

    fn snapshot(generation: u64, source: DataSource) -> GrowthSnapshot {
        let config = InstrumentConfig { symbol: "601088", display_name: "中国神华" };
        let history = vec![DailyObservation {
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            price: 40.0,
            daily_growth_pct: 0.0,
            cumulative_growth_pct: 0.0,
        }];
        GrowthSnapshot {
            instruments: vec![TrackedInstrument::from_history(&config, history).unwrap()],
            source,
            refreshed_at: "2025-12-01T09:30:00+08:00".parse().unwrap(),
            generation,
        }
    }

    #[test]
    fn test_empty_provider() {
        let provider = SnapshotProvider::new();
        assert!(provider.latest().is_none());
        assert!(provider.latest_generation().is_none());
        assert!(provider.get_by_symbol("601088").is_none());
    }

    #[test]
    fn test_newer_generation_replaces() {
        let provider = SnapshotProvider::new();
        assert!(provider.apply(snapshot(1, DataSource::Simulated)));
        assert!(provider.apply(snapshot(2, DataSource::Real)));

        let latest = provider.latest().unwrap();
        assert_eq!(latest.generation, 2);
        assert_eq!(latest.source, DataSource::Real);
        assert_eq!(provider.get_by_symbol("601088").unwrap().latest_price, 40.0);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let provider = SnapshotProvider::new();
        assert!(provider.apply(snapshot(3, DataSource::Real)));
        assert!(!provider.apply(snapshot(2, DataSource::Simulated)));
        assert!(!provider.apply(snapshot(3, DataSource::Simulated)));

        assert_eq!(provider.latest_generation(), Some(3));
        assert_eq!(provider.latest().unwrap().source, DataSource::Real);
    }
}
