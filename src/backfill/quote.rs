use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::time;

use crate::{
    cache::SHARE,
    crawler::{self, yahoo},
    database,
    database::table::{price_log::PriceLog, stock::Stock},
    declare::{self, QuoteProvenance, StockQuotes},
    logging,
};

/// 單一股票抓取間的延遲，對報價來源限速
const FETCH_DELAY: Duration = Duration::from_millis(1500);

/// 單一股票這一輪更新的結果摘要，HTTP 觸發端點直接回給呼叫端
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub stock_symbol: String,
    pub price: f64,
    pub simulated: bool,
    pub status: &'static str,
}

/// 對整份成分股清單跑一輪報價更新。
///
/// 順序固定：先確保主檔齊全，再逐檔抓報價（主來源 → HTML 備援 → 模擬值），
/// 一檔失敗記錄後繼續，整輪不中斷。每檔的快照更新與 price_logs 寫入
/// 包在同一筆 transaction。
///
/// # Errors
/// 僅在整輪流程無法開始（例如資料庫完全連不上）時回傳錯誤。
pub async fn execute() -> Result<Vec<RefreshOutcome>> {
    // 成分股主檔先補齊，新加入的股票才有列可以更新
    for constituent in declare::SETHD30.iter() {
        let stock = Stock::from(constituent);
        if let Err(why) = stock.upsert_metadata().await {
            logging::error_file_async(format!(
                "Failed to upsert_metadata({}) because {:?}",
                constituent.stock_symbol, why
            ));
        }
    }

    let mut outcomes = Vec::with_capacity(declare::SETHD30.len());

    for constituent in declare::SETHD30.iter() {
        outcomes.push(refresh_symbol(constituent).await);
        time::sleep(FETCH_DELAY).await;
    }

    SHARE.load().await;

    Ok(outcomes)
}

/// 更新單一股票：抓報價、寫快照、寫歷史
async fn refresh_symbol(constituent: &declare::Constituent) -> RefreshOutcome {
    let stock_symbol = constituent.stock_symbol;

    match yahoo::summary::visit(stock_symbol).await {
        Ok(summary) => {
            let stock = stock_from_summary(constituent, &summary);
            finish(stock, summary.change_percent, QuoteProvenance::Real).await
        }
        Err(why) => {
            logging::warn_file_async(format!(
                "Failed to fetch summary({}) because {:?}, falling back",
                stock_symbol, why
            ));

            let (quotes, provenance) =
                match crawler::fetch_stock_quotes_from_remote_site(stock_symbol).await {
                    Ok(quotes) => (quotes, QuoteProvenance::Real),
                    Err(why) => {
                        logging::error_file_async(format!(
                            "Failed to fetch stock quotes({}) because {:?}, simulating",
                            stock_symbol, why
                        ));
                        (
                            crawler::simulated_stock_quotes(stock_symbol),
                            QuoteProvenance::Simulated,
                        )
                    }
                };

            let stock = stock_from_quotes(constituent, &quotes);
            finish(stock, quotes.change_percent, provenance).await
        }
    }
}

async fn finish(
    stock: Stock,
    change_percent: f64,
    provenance: QuoteProvenance,
) -> RefreshOutcome {
    let mut price_log = PriceLog::new(stock.stock_symbol.clone());
    price_log.price = stock.price;
    price_log.change = stock.change;
    price_log.change_percent = change_percent;
    price_log.provenance = provenance;

    let price = stock.price.to_f64().unwrap_or(0.0);
    let stock_symbol = stock.stock_symbol.clone();

    match apply_quote(stock, price_log).await {
        Ok(_) => RefreshOutcome {
            stock_symbol,
            price,
            simulated: provenance == QuoteProvenance::Simulated,
            status: "success",
        },
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to apply_quote({}) because {:?}",
                stock_symbol, why
            ));

            RefreshOutcome {
                stock_symbol,
                price,
                simulated: provenance == QuoteProvenance::Simulated,
                status: "error",
            }
        }
    }
}

/// 快照更新與歷史寫入要嘛都成功，要嘛都回滾
async fn apply_quote(stock: Stock, price_log: PriceLog) -> Result<()> {
    let mut tx = database::get_tx().await.context("Failed to begin tx")?;

    if let Err(why) = stock.update_quote(&mut tx).await {
        tx.rollback().await?;
        return Err(why);
    }

    if let Err(why) = price_log.insert(&mut tx).await {
        tx.rollback().await?;
        return Err(why);
    }

    tx.commit().await?;

    SHARE.set_stock(stock);

    Ok(())
}

/// 主來源成功時的完整快照，基本面一併更新
fn stock_from_summary(
    constituent: &declare::Constituent,
    summary: &yahoo::summary::StockSummary,
) -> Stock {
    let mut stock = current_or_new(constituent);

    stock.price = decimal(summary.price);
    stock.change = decimal(summary.change);
    stock.change_percent = summary.change_percent;
    stock.pe_ratio = summary.pe_ratio;
    stock.pb_ratio = summary.pb_ratio;
    stock.payout_ratio = summary.payout_ratio;
    stock.current_yield = summary.current_yield;
    stock.avg_yield_5y = summary.avg_yield_5y;
    stock.revenue_growth_yoy = summary.revenue_growth_yoy;
    stock.profit_growth_yoy = summary.profit_growth_yoy;
    stock.year_high = decimal(summary.year_high);
    stock.year_low = decimal(summary.year_low);
    stock.market_cap = decimal(summary.market_cap);
    stock.volume = summary.volume;
    stock.avg_volume = summary.avg_volume;
    stock.updated_at = Local::now();

    stock
}

/// 備援來源只有價格與漲跌，基本面沿用快取裡的舊值
fn stock_from_quotes(constituent: &declare::Constituent, quotes: &StockQuotes) -> Stock {
    let mut stock = current_or_new(constituent);

    stock.price = decimal(quotes.price);
    stock.change = decimal(quotes.change);
    stock.change_percent = quotes.change_percent;
    stock.updated_at = Local::now();

    stock
}

fn current_or_new(constituent: &declare::Constituent) -> Stock {
    SHARE
        .get_stock(constituent.stock_symbol)
        .unwrap_or_else(|| Stock::from(constituent))
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[test]
    fn test_stock_from_quotes_keeps_fundamentals() {
        let constituent = &declare::SETHD30[1];
        let mut cached = Stock::from(constituent);
        cached.pe_ratio = 9.8;
        cached.current_yield = 5.8;
        SHARE.set_stock(cached);

        let quotes = StockQuotes {
            stock_symbol: constituent.stock_symbol.to_string(),
            price: 35.0,
            change: 0.5,
            change_percent: 1.45,
        };

        let stock = stock_from_quotes(constituent, &quotes);

        assert_eq!(stock.pe_ratio, 9.8);
        assert_eq!(stock.current_yield, 5.8);
        assert_eq!(stock.change_percent, 1.45);
    }

    #[tokio::test]
    #[ignore]
    async fn test_execute() {
        dotenv::dotenv().ok();
        SHARE.load().await;
        logging::debug_file_async("開始 backfill::quote::execute".to_string());

        match execute().await {
            Ok(outcomes) => {
                for outcome in outcomes {
                    logging::debug_file_async(format!("{:?}", outcome));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to execute because {:?}", why));
            }
        }

        logging::debug_file_async("結束 backfill::quote::execute".to_string());
    }
}
