use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::database;

/// 市場新聞。
///
/// 本專案沒有新聞抓取來源，這張表由外部流程餵入，這裡只保留讀取路徑
/// 供跑馬燈合併快訊使用。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct MarketNews {
    pub title: String,
    /// regulatory 類的新聞在跑馬燈上升級成 warning
    pub news_type: String,
    pub stock_symbol: Option<String>,
    pub published_at: DateTime<Local>,
}

impl MarketNews {
    /// 取得最近的新聞（新到舊）
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch_recent(limit: i64) -> Result<Vec<MarketNews>> {
        let sql = r#"
SELECT
    title,
    news_type,
    stock_symbol,
    published_at
FROM
    market_news
ORDER BY
    published_at DESC
LIMIT $1;
"#;
        sqlx::query_as::<_, MarketNews>(sql)
            .bind(limit)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to MarketNews::fetch_recent from database")
    }
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_fetch_recent() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 MarketNews::fetch_recent".to_string());

        match MarketNews::fetch_recent(5).await {
            Ok(news) => {
                for e in news {
                    logging::debug_file_async(format!("{:?} ", e));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch_recent because {:?}", why));
            }
        }

        logging::debug_file_async("結束 MarketNews::fetch_recent".to_string());
    }
}
