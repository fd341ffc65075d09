use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};

/// 将股票代码转换为东方财富 secid
/// 1 = 上交所（5、6 开头）, 0 = 深交所（其余）
pub fn secid_for(symbol: &str) -> String {
    if symbol.starts_with('5') || symbol.starts_with('6') {
        format!("1.{}", symbol)
    } else {
        format!("0.{}", symbol)
    }
}

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

// 日期转换工具
pub fn date_to_compact(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 北京时间 (+08:00)
pub fn beijing_now() -> DateTime<FixedOffset> {
    let now = Utc::now();
    FixedOffset::east_opt(8 * 3600)
        .map(|tz| now.with_timezone(&tz))
        .unwrap_or_else(|| now.fixed_offset())
}

pub fn beijing_today() -> NaiveDate {
    beijing_now().date_naive()
}

pub fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// [start, end] 区间内的所有工作日（周一至周五）
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        if !is_weekend(&date) {
            days.push(date);
        }
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}

/// 去掉 JSONP 包装 `callback({...});`，普通 JSON 原样返回
pub fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => &trimmed[open + 1..close],
        _ => trimmed,
    }
}
