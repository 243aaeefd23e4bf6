use anyhow::Result;
use chrono::Datelike;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::{crawler::yahoo::chart, crawler::yahoo::to_provider_symbol, util};

/// 一筆配息事件
#[derive(Debug, Clone)]
pub struct Dividend {
    pub stock_symbol: String,
    pub ex_date: chrono::NaiveDate,
    pub amount: Decimal,
    /// Interim 或 Final
    pub kind: &'static str,
}

/// 取得近五年的配息事件。
///
/// 報價來源只給除息日與金額，Interim/Final 以除息月份推斷：
/// 泰股的期中配息慣例落在下半年。
///
/// # Errors
/// 當請求失敗或回應有誤時回傳錯誤。
pub async fn visit(stock_symbol: &str) -> Result<Vec<Dividend>> {
    let provider_symbol = to_provider_symbol(stock_symbol);
    let query = format!("{}?range=5y&interval=1mo&events=div", provider_symbol);
    let result = chart::visit_chart_api(&query).await?;

    let mut dividends: Vec<Dividend> = result
        .events
        .and_then(|e| e.dividends)
        .map(|map| {
            map.into_values()
                .filter_map(|event| {
                    let ex_date = util::datetime::bangkok_from_timestamp(event.date)?.date_naive();
                    let amount = Decimal::from_f64(event.amount)?;

                    Some(Dividend {
                        stock_symbol: stock_symbol.to_string(),
                        ex_date,
                        amount,
                        kind: classify(ex_date.month()),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    dividends.sort_by_key(|d| d.ex_date);

    Ok(dividends)
}

fn classify(ex_month: u32) -> &'static str {
    if ex_month >= 7 {
        "Interim"
    } else {
        "Final"
    }
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(8), "Interim");
        assert_eq!(classify(4), "Final");
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 dividend::visit".to_string());

        match visit("PTT").await {
            Ok(dividends) => {
                logging::debug_file_async(format!("dividend : {:#?}", dividends));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit because {:?}", why));
            }
        }

        logging::debug_file_async("結束 dividend::visit".to_string());
    }
}
