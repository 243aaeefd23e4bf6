use std::time::Duration;

use anyhow::Result;
use tokio::time;

use crate::{
    crawler::yahoo,
    database::table::dividend_history::DividendHistory,
    declare, logging,
};

/// 單一股票抓取間的延遲
const FETCH_DELAY: Duration = Duration::from_millis(1500);

/// 向報價來源回補全體成分股的配息歷史。
///
/// dividend_history 只增不改，已存在的事件由唯一鍵擋掉，
/// 因此重跑不會產生重複列。
///
/// # Errors
/// 不回傳錯誤給排程器；單檔失敗記錄後繼續下一檔。
pub async fn execute() -> Result<()> {
    let mut inserted: u64 = 0;

    for constituent in declare::SETHD30.iter() {
        match yahoo::dividend::visit(constituent.stock_symbol).await {
            Ok(dividends) => {
                for dividend in dividends {
                    let record = DividendHistory {
                        stock_symbol: dividend.stock_symbol.clone(),
                        ex_date: dividend.ex_date,
                        payment_date: None,
                        amount: dividend.amount,
                        kind: dividend.kind.to_string(),
                    };

                    match record.upsert().await {
                        Ok(result) => inserted += result.rows_affected(),
                        Err(why) => {
                            logging::error_file_async(format!(
                                "Failed to upsert dividend_history because {:?}",
                                why
                            ));
                        }
                    }
                }
            }
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to fetch dividends({}) because {:?}",
                    constituent.stock_symbol, why
                ));
            }
        }

        time::sleep(FETCH_DELAY).await;
    }

    logging::info_file_async(format!("dividend backfill finished, {} new rows", inserted));

    Ok(())
}
