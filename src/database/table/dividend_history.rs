use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgQueryResult;

use crate::{database, util::map::Keyable};

/// 股息發放事件，(stock_symbol, ex_date, kind) 為唯一鍵，只增不改。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DividendHistory {
    pub stock_symbol: String,
    /// 除息日
    pub ex_date: NaiveDate,
    /// 發放日
    pub payment_date: Option<NaiveDate>,
    /// 每股配息（泰銖）
    pub amount: Decimal,
    /// Interim 或 Final
    pub kind: String,
}

impl DividendHistory {
    /// 寫入一筆配息紀錄，已存在的事件直接略過
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn upsert(&self) -> Result<PgQueryResult> {
        let sql = r#"
INSERT INTO dividend_history (stock_symbol, ex_date, payment_date, amount, kind)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (stock_symbol, ex_date, kind) DO NOTHING;
"#;
        sqlx::query(sql)
            .bind(&self.stock_symbol)
            .bind(self.ex_date)
            .bind(self.payment_date)
            .bind(self.amount)
            .bind(&self.kind)
            .execute(database::get_connection())
            .await
            .context("Failed to DividendHistory::upsert")
    }

    /// 取得指定股票的配息歷史（新到舊）
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch(stock_symbol: &str) -> Result<Vec<DividendHistory>> {
        let sql = r#"
SELECT
    stock_symbol,
    ex_date,
    payment_date,
    amount,
    kind
FROM
    dividend_history
WHERE
    stock_symbol = $1
ORDER BY
    ex_date DESC;
"#;
        sqlx::query_as::<_, DividendHistory>(sql)
            .bind(stock_symbol)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to DividendHistory::fetch from database")
    }

    /// 取得最近 N 天內除息的紀錄，跑馬燈的配息快訊吃這個
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch_recent(days: i32, limit: i64) -> Result<Vec<DividendHistory>> {
        let sql = r#"
SELECT
    stock_symbol,
    ex_date,
    payment_date,
    amount,
    kind
FROM
    dividend_history
WHERE
    ex_date >= CURRENT_DATE - $1
ORDER BY
    ex_date DESC
LIMIT $2;
"#;
        sqlx::query_as::<_, DividendHistory>(sql)
            .bind(days)
            .bind(limit)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to DividendHistory::fetch_recent from database")
    }
}

impl Keyable for DividendHistory {
    fn key(&self) -> String {
        format!("{}-{}-{}", self.stock_symbol, self.ex_date, self.kind)
    }

    fn key_with_prefix(&self) -> String {
        format!("DividendHistory:{}", self.key())
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
        logging::debug_file_async("開始 DividendHistory::fetch_recent".to_string());

        match DividendHistory::fetch_recent(7, 10).await {
            Ok(dividends) => {
                for e in dividends {
                    logging::debug_file_async(format!("{:?} ", e));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch_recent because {:?}", why));
            }
        }

        logging::debug_file_async("結束 DividendHistory::fetch_recent".to_string());
    }
}
