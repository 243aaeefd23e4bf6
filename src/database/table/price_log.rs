use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use sqlx::{postgres::PgQueryResult, Postgres, Transaction};

use crate::{database, declare::QuoteProvenance};

/// 報價歷史，每次抓取循環每檔股票各寫一列，只插入不更新。
///
/// provenance 欄位紀錄該筆是真實報價還是抓取失敗後的模擬值。
#[derive(Debug, Clone)]
pub struct PriceLog {
    pub stock_symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: f64,
    pub provenance: QuoteProvenance,
    pub captured_at: DateTime<Local>,
}

impl PriceLog {
    pub fn new(stock_symbol: String) -> Self {
        PriceLog {
            stock_symbol,
            price: Default::default(),
            change: Default::default(),
            change_percent: 0.0,
            provenance: QuoteProvenance::Real,
            captured_at: Local::now(),
        }
    }

    /// 寫入一筆報價歷史，與 stocks 的快照更新共用 transaction
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn insert(
        &self,
        tx: &mut Transaction<'static, Postgres>,
    ) -> Result<PgQueryResult> {
        let sql = r#"
INSERT INTO price_logs (stock_symbol, price, change, change_percent, provenance, captured_at)
VALUES ($1, $2, $3, $4, $5, $6);
"#;
        sqlx::query(sql)
            .bind(&self.stock_symbol)
            .bind(self.price)
            .bind(self.change)
            .bind(self.change_percent)
            .bind(self.provenance.as_ref())
            .bind(self.captured_at)
            .execute(&mut **tx)
            .await
            .context("Failed to PriceLog::insert")
    }

    /// 取得指定股票最近的報價歷史（新到舊）
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch_recent(stock_symbol: &str, limit: i64) -> Result<Vec<PriceLog>> {
        let sql = r#"
SELECT
    stock_symbol,
    price,
    change,
    change_percent,
    provenance,
    captured_at
FROM
    price_logs
WHERE
    stock_symbol = $1
ORDER BY
    captured_at DESC
LIMIT $2;
"#;
        let rows = sqlx::query_as::<_, (String, Decimal, Decimal, f64, String, DateTime<Local>)>(sql)
            .bind(stock_symbol)
            .bind(limit)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to PriceLog::fetch_recent from database")?;

        Ok(rows
            .into_iter()
            .map(
                |(stock_symbol, price, change, change_percent, provenance, captured_at)| PriceLog {
                    stock_symbol,
                    price,
                    change,
                    change_percent,
                    provenance: provenance
                        .parse::<QuoteProvenance>()
                        .unwrap_or(QuoteProvenance::Real),
                    captured_at,
                },
            )
            .collect())
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
        logging::debug_file_async("開始 PriceLog::fetch_recent".to_string());

        match PriceLog::fetch_recent("PTT", 10).await {
            Ok(logs) => {
                for e in logs {
                    logging::debug_file_async(format!("{:?} ", e));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch_recent because {:?}", why));
            }
        }

        logging::debug_file_async("結束 PriceLog::fetch_recent".to_string());
    }
}
