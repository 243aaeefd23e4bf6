use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::{
    crawler::yahoo::{to_provider_symbol, HOST},
    util,
};

/// quoteSummary API 的數值欄位，raw 為未格式化的數值
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawValue {
    pub raw: Option<f64>,
}

impl RawValue {
    fn value(&self) -> f64 {
        self.raw.unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_price: RawValue,
    #[serde(default)]
    regular_market_change: RawValue,
    #[serde(default)]
    regular_market_change_percent: RawValue,
    #[serde(default)]
    regular_market_volume: RawValue,
    #[serde(default)]
    market_cap: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    // 來源欄位是 trailingPE，不是 camelCase 推得出來的 trailingPe
    #[serde(default, rename = "trailingPE")]
    trailing_pe: RawValue,
    #[serde(default)]
    dividend_yield: RawValue,
    #[serde(default)]
    five_year_avg_dividend_yield: RawValue,
    #[serde(default)]
    payout_ratio: RawValue,
    #[serde(default)]
    fifty_two_week_high: RawValue,
    #[serde(default)]
    fifty_two_week_low: RawValue,
    #[serde(default)]
    average_volume: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    price_to_book: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    current_price: RawValue,
    #[serde(default)]
    revenue_growth: RawValue,
    #[serde(default)]
    earnings_growth: RawValue,
}

/// 一檔股票的完整報價與基本面快照。
///
/// 比率欄位（殖利率、盈餘分配率、營收/獲利年增率、漲幅）一律換算成百分比。
#[derive(Debug, Clone, Default)]
pub struct StockSummary {
    pub stock_symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub payout_ratio: f64,
    pub current_yield: f64,
    pub avg_yield_5y: f64,
    pub revenue_growth_yoy: f64,
    pub profit_growth_yoy: f64,
    pub year_high: f64,
    pub year_low: f64,
    pub market_cap: f64,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
}

/// 取得報價與基本面數據。
///
/// # Errors
/// 當請求失敗、回應有誤或連市價都沒有時回傳錯誤。
pub async fn visit(stock_symbol: &str) -> Result<StockSummary> {
    let provider_symbol = to_provider_symbol(stock_symbol);
    let url = format!(
        "https://{host}/v10/finance/quoteSummary/{symbol}?modules=price,summaryDetail,defaultKeyStatistics,financialData",
        host = HOST,
        symbol = provider_symbol
    );

    let response = util::http::get_json::<QuoteSummaryResponse>(&url).await?;

    if let Some(error) = response.quote_summary.error {
        return Err(anyhow!("quoteSummary returned error: {}", error));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| anyhow!("quoteSummary returned empty result for {}", stock_symbol))?;

    let price_module = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let key_stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    let mut price = price_module.regular_market_price.value();
    if price == 0.0 {
        price = financial.current_price.value();
    }

    if price == 0.0 {
        return Err(anyhow!("No market price for {}", stock_symbol));
    }

    Ok(StockSummary {
        stock_symbol: stock_symbol.to_string(),
        price,
        change: price_module.regular_market_change.value(),
        change_percent: price_module.regular_market_change_percent.value() * 100.0,
        pe_ratio: detail.trailing_pe.value(),
        pb_ratio: key_stats.price_to_book.value(),
        payout_ratio: detail.payout_ratio.value() * 100.0,
        current_yield: detail.dividend_yield.value() * 100.0,
        // fiveYearAvgDividendYield 已是百分比，不再換算
        avg_yield_5y: detail.five_year_avg_dividend_yield.value(),
        revenue_growth_yoy: financial.revenue_growth.value() * 100.0,
        profit_growth_yoy: financial.earnings_growth.value() * 100.0,
        year_high: detail.fifty_two_week_high.value(),
        year_low: detail.fifty_two_week_low.value(),
        market_cap: price_module.market_cap.value(),
        volume: to_volume(price_module.regular_market_volume.raw),
        avg_volume: to_volume(detail.average_volume.raw),
    })
}

fn to_volume(raw: Option<f64>) -> Option<i64> {
    raw.filter(|v| *v > 0.0).map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[test]
    fn test_to_volume() {
        assert_eq!(to_volume(Some(12345.0)), Some(12345));
        assert_eq!(to_volume(Some(0.0)), None);
        assert_eq!(to_volume(None), None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 summary::visit".to_string());

        match visit("PTT").await {
            Ok(summary) => {
                logging::debug_file_async(format!("summary : {:#?}", summary));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit because {:?}", why));
            }
        }

        logging::debug_file_async("結束 summary::visit".to_string());
    }
}
