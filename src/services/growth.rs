use crate::errors::{Result, TrackerError};
use crate::models::growth::{DailyObservation, PricePoint};
use crate::util::round2;

/// 由按日期升序的收盘价序列计算日涨幅与累计涨幅。
///
/// 以首个价格为基准 (0%)。两个涨幅均由原始价格直接计算，只对输出四舍五入到两位小数。
/// 空序列返回空结果；价格为零、负数或非有限值时整条序列被拒绝。
pub fn compute_growth(points: &[PricePoint]) -> Result<Vec<DailyObservation>> {
    let base = match points.first() {
        Some(first) => first.price,
        None => return Ok(Vec::new()),
    };

    if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
        return Err(TrackerError::DataError(format!(
            "Invalid price {} on {}", bad.price, bad.date
        )));
    }

    let mut prev = base;
    let history = points
        .iter()
        .map(|point| {
            let observation = DailyObservation {
                date: point.date,
                price: point.price,
                daily_growth_pct: round2((point.price - prev) / prev * 100.0),
                cumulative_growth_pct: round2((point.price - base) / base * 100.0),
            };
            prev = point.price;
            observation
        })
        .collect();

    Ok(history)
}
