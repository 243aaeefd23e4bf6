use anyhow::Result;
use chrono::Local;

use crate::{
    bot, cache,
    crawler::yahoo,
    database::table::market_summary::MarketSummary,
    logging,
};

/// SET 指數在報價來源上的代號
const SET_INDEX_SYMBOL: &str = "^SET.BK";

/// 抓取 SET 大盤指數並覆寫 market_summary。
///
/// 當天第一次成功更新時推播一則大盤訊息，之後的循環只默默覆寫。
///
/// # Errors
/// 當指數報價抓取失敗時回傳錯誤；單一 key 的寫入失敗記錄後繼續。
pub async fn execute() -> Result<()> {
    let summary = yahoo::summary::visit(SET_INDEX_SYMBOL).await?;

    let entries = [
        MarketSummary::new("set_index", summary.price, "SET Index Value"),
        MarketSummary::new("set_change", summary.change, "SET Index Change"),
        MarketSummary::new(
            "set_change_percent",
            summary.change_percent,
            "SET Index Change Percent",
        ),
        MarketSummary::new("set_year_high", summary.year_high, "SET 52-Week High"),
        MarketSummary::new("set_year_low", summary.year_low, "SET 52-Week Low"),
    ];

    for entry in &entries {
        if let Err(why) = entry.upsert().await {
            logging::error_file_async(format!(
                "Failed to upsert market_summary({}) because {:?}",
                entry.key, why
            ));
        }
    }

    notify_once_per_day(summary.price, summary.change).await;

    Ok(())
}

/// 每天只推播一次大盤指數
async fn notify_once_per_day(index: f64, change: f64) {
    let key = format!("MarketSummary:{}", Local::now().format("%Y-%m-%d"));
    if cache::TTL.contains(&key) {
        return;
    }

    cache::TTL.set(key, index.to_string());

    let msg = format!("SET 大盤指數︰{:.2} 漲跌︰{:+.2}", index, change);
    if let Err(why) = bot::telegram::send(&msg).await {
        logging::error_file_async(format!(
            "Failed to telegram::send because: {:?}",
            why
        ));
    }
}
