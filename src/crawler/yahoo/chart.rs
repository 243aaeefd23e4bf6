use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::{
    crawler::yahoo::{to_provider_symbol, HOST},
    declare::ChartPoint,
    util,
};

/// v8 chart API 的回應
#[derive(Debug, Deserialize)]
pub(super) struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartResult {
    pub meta: Meta,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
    pub events: Option<Events>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Meta {
    pub symbol: String,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Indicators {
    pub quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteBlock {
    pub close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Events {
    pub dividends: Option<std::collections::HashMap<String, DividendEvent>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

/// 走勢圖資料與標頭
#[derive(Debug)]
pub struct Intraday {
    /// 報價來源使用的代號（含 .BK 後綴）
    pub provider_symbol: String,
    pub currency: Option<String>,
    pub points: Vec<ChartPoint>,
}

pub(super) async fn visit_chart_api(query: &str) -> Result<ChartResult> {
    let url = format!("https://{host}/v8/finance/chart/{query}", host = HOST);
    let response = util::http::get_json::<ChartResponse>(&url).await?;

    if let Some(error) = response.chart.error {
        return Err(anyhow!("Chart API returned error: {}", error));
    }

    response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| anyhow!("Chart API returned empty result for {}", query))
}

/// 取得近一個交易日、5 分鐘間隔的走勢資料。
///
/// 回傳的序列未經交易時段過濾，收盤值缺漏的取樣點會被略過。
///
/// # Errors
/// 當請求失敗、回應有誤或完全沒有資料時回傳錯誤。
pub async fn visit(stock_symbol: &str) -> Result<Intraday> {
    let provider_symbol = to_provider_symbol(stock_symbol);
    let query = format!("{}?range=1d&interval=5m", provider_symbol);
    let result = visit_chart_api(&query).await?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.clone())
        .unwrap_or_default();

    let points = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            close.map(|price| ChartPoint {
                time: *ts,
                price: Some(price),
            })
        })
        .collect();

    Ok(Intraday {
        provider_symbol,
        currency: result.meta.currency,
        points,
    })
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 chart::visit".to_string());

        match visit("KBANK").await {
            Ok(intraday) => {
                logging::debug_file_async(format!(
                    "{} points for {}",
                    intraday.points.len(),
                    intraday.provider_symbol
                ));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit because {:?}", why));
            }
        }

        logging::debug_file_async("結束 chart::visit".to_string());
    }
}
