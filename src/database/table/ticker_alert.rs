use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use sqlx::postgres::PgQueryResult;

use crate::database;

/// 跑馬燈警示歷史，警示產生器每次觸發寫入一列。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TickerAlert {
    pub stock_symbol: String,
    pub alert_type: String,
    pub message: String,
    pub value: Option<f64>,
    pub change_percent: Option<f64>,
    pub severity: String,
    pub created_at: DateTime<Local>,
}

impl TickerAlert {
    /// 寫入一筆警示歷史
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn insert(&self) -> Result<PgQueryResult> {
        let sql = r#"
INSERT INTO ticker_alerts (stock_symbol, alert_type, message, value, change_percent, severity, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7);
"#;
        sqlx::query(sql)
            .bind(&self.stock_symbol)
            .bind(&self.alert_type)
            .bind(&self.message)
            .bind(self.value)
            .bind(self.change_percent)
            .bind(&self.severity)
            .bind(self.created_at)
            .execute(database::get_connection())
            .await
            .context("Failed to TickerAlert::insert")
    }

    /// 取得最近的警示（新到舊）
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch_recent(limit: i64) -> Result<Vec<TickerAlert>> {
        let sql = r#"
SELECT
    stock_symbol,
    alert_type,
    message,
    value,
    change_percent,
    severity,
    created_at
FROM
    ticker_alerts
ORDER BY
    created_at DESC
LIMIT $1;
"#;
        sqlx::query_as::<_, TickerAlert>(sql)
            .bind(limit)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to TickerAlert::fetch_recent from database")
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
        logging::debug_file_async("開始 TickerAlert::fetch_recent".to_string());

        match TickerAlert::fetch_recent(10).await {
            Ok(alerts) => {
                for e in alerts {
                    logging::debug_file_async(format!("{:?} ", e));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch_recent because {:?}", why));
            }
        }

        logging::debug_file_async("結束 TickerAlert::fetch_recent".to_string());
    }
}
