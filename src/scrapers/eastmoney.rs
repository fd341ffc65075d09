use crate::config::Config;
use crate::errors::{Result, TrackerError};
use crate::models::growth::PricePoint;
use crate::scrapers::base::HistorySource;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 开放式结束日期
const OPEN_END: &str = "20991231";

#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    #[serde(default)]
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Option<Vec<String>>,
}

/// 东方财富K线数据抓取器
pub struct EastmoneyScraper {
    client: Client,
    endpoint: String,
}

impl EastmoneyScraper {
    /// 创建新的东方财富数据抓取器
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TrackerError::RequestError)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// 请求参数
    /// fields2: f51=日期, f53=收盘价; klt=101 日K; fqt=1 前复权
    pub fn query_params(secid: &str, start: &NaiveDate) -> [(&'static str, String); 7] {
        [
            ("secid", secid.to_string()),
            ("fields1", "f1".to_string()),
            ("fields2", "f51,f53".to_string()),
            ("klt", "101".to_string()),
            ("fqt", "1".to_string()),
            ("beg", util::date_to_compact(start)),
            ("end", OPEN_END.to_string()),
        ]
    }
}

#[async_trait]
impl HistorySource for EastmoneyScraper {
    fn source_name(&self) -> &'static str {
        "eastmoney"
    }

    async fn fetch_history(&self, symbol: &str, start: &NaiveDate) -> Result<Vec<PricePoint>> {
        let secid = util::secid_for(symbol);
        debug!("获取 {} 自 {} 起的日K线", secid, start);

        let response = self.client
            .get(&self.endpoint)
            .query(&Self::query_params(&secid, start))
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let text = response.text().await?;
        let records = parse_kline_body(&text, &secid)?;

        debug!("{} 获取到 {} 条K线记录", secid, records.len());
        Ok(records)
    }
}

/// 解析接口返回体，data/klines 缺失或为空视为无数据
pub fn parse_kline_body(text: &str, secid: &str) -> Result<Vec<PricePoint>> {
    let envelope: KlineEnvelope = serde_json::from_str(util::strip_jsonp(text))?;

    let klines = envelope
        .data
        .and_then(|d| d.klines)
        .unwrap_or_default();

    if klines.is_empty() {
        return Err(TrackerError::EmptyResult(secid.to_string()));
    }

    // 按日期升序，同一日期保留最后一条
    let mut by_date = BTreeMap::new();
    for line in &klines {
        let point = parse_kline_record(line)?;
        by_date.insert(point.date, point.price);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, price)| PricePoint { date, price })
        .collect())
}

/// 解析单条记录 "2025-12-01,9.87"
pub fn parse_kline_record(line: &str) -> Result<PricePoint> {
    let mut fields = line.split(',');
    let (date, price) = match (fields.next(), fields.next()) {
        (Some(date), Some(price)) => (date.trim(), price.trim()),
        _ => return Err(TrackerError::DataError(format!("Invalid kline record: {}", line))),
    };

    Ok(PricePoint {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
        price: price.parse::<f64>()?,
    })
}
