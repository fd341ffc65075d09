use chrono::NaiveDate;
use std::time::Duration;
use crate::models::growth::InstrumentConfig;

/// 东方财富日K线接口
pub const KLINE_ENDPOINT: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// 基准日（累计涨幅的 0% 锚点）
pub const BASELINE_DATE: &str = "2025-12-01";

/// 追踪的股票列表
pub const TRACKED_INSTRUMENTS: &[InstrumentConfig] = &[
    InstrumentConfig { symbol: "601186", display_name: "中国铁建" },
    InstrumentConfig { symbol: "601390", display_name: "中国中铁" },
    InstrumentConfig { symbol: "600048", display_name: "保利发展" },
    InstrumentConfig { symbol: "001979", display_name: "招商蛇口" },
    InstrumentConfig { symbol: "600585", display_name: "海螺水泥" },
    InstrumentConfig { symbol: "600887", display_name: "伊利股份" },
    InstrumentConfig { symbol: "600690", display_name: "海尔智家" },
    InstrumentConfig { symbol: "601225", display_name: "陕西煤业" },
    InstrumentConfig { symbol: "601088", display_name: "中国神华" },
    InstrumentConfig { symbol: "601600", display_name: "中国铝业" },
];

pub struct Config {
    pub baseline_date: NaiveDate,
    pub endpoint: String,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub volatility: f64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            baseline_date: baseline_date(),
            endpoint: KLINE_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(15),
            max_concurrency: TRACKED_INSTRUMENTS.len(),
            volatility: 0.015,
        }
    }

    pub fn with_baseline_date(mut self, date: NaiveDate) -> Self {
        self.baseline_date = date;
        self
    }

    // 测试时指向本地 mock 服务
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn baseline_date() -> NaiveDate {
    // 编译期常量，格式固定
    NaiveDate::parse_from_str(BASELINE_DATE, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}
