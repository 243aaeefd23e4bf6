use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use sqlx::{postgres::PgQueryResult, Postgres, Transaction};

use crate::{database, declare, util::map::Keyable};

/// 成分股主檔，一列一檔股票，快取最新報價與基本面數據。
///
/// 原表名 stocks，stock_symbol 為唯一鍵。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Stock {
    pub stock_symbol: String,
    pub name: String,
    pub sector: String,
    pub price: Decimal,
    /// 漲跌
    pub change: Decimal,
    /// 漲幅(%)
    pub change_percent: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    /// 盈餘分配率(%)
    pub payout_ratio: f64,
    pub revenue_growth_yoy: f64,
    pub profit_growth_yoy: f64,
    /// 目前殖利率(%)
    pub current_yield: f64,
    /// 五年平均殖利率(%)
    pub avg_yield_5y: f64,
    /// 52 週最高價
    pub year_high: Decimal,
    /// 52 週最低價
    pub year_low: Decimal,
    pub market_cap: Decimal,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
    pub updated_at: DateTime<Local>,
}

impl Stock {
    pub fn new(stock_symbol: String) -> Self {
        Stock {
            stock_symbol,
            name: String::new(),
            sector: String::new(),
            price: Default::default(),
            change: Default::default(),
            change_percent: 0.0,
            pe_ratio: 0.0,
            pb_ratio: 0.0,
            payout_ratio: 0.0,
            revenue_growth_yoy: 0.0,
            profit_growth_yoy: 0.0,
            current_yield: 0.0,
            avg_yield_5y: 0.0,
            year_high: Default::default(),
            year_low: Default::default(),
            market_cap: Default::default(),
            volume: None,
            avg_volume: None,
            updated_at: Local::now(),
        }
    }

    /// 衝突時更新 name 與 sector，報價欄位不動
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn upsert_metadata(&self) -> Result<PgQueryResult> {
        let sql = r#"
INSERT INTO stocks (stock_symbol, name, sector, updated_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (stock_symbol) DO UPDATE SET
    name = EXCLUDED.name,
    sector = EXCLUDED.sector;
"#;
        sqlx::query(sql)
            .bind(&self.stock_symbol)
            .bind(&self.name)
            .bind(&self.sector)
            .bind(self.updated_at)
            .execute(database::get_connection())
            .await
            .context("Failed to Stock::upsert_metadata")
    }

    /// 將最新報價與基本面寫回主檔。
    ///
    /// 與 price_logs 的寫入共用同一筆 transaction，兩個寫入要嘛一起成功
    /// 要嘛一起回滾，不會留下「快照更新了但沒有對應歷史」的半套狀態。
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn update_quote(
        &self,
        tx: &mut Transaction<'static, Postgres>,
    ) -> Result<PgQueryResult> {
        let sql = r#"
UPDATE stocks
SET
    price = $2,
    change = $3,
    change_percent = $4,
    pe_ratio = $5,
    pb_ratio = $6,
    payout_ratio = $7,
    revenue_growth_yoy = $8,
    profit_growth_yoy = $9,
    current_yield = $10,
    avg_yield_5y = $11,
    year_high = $12,
    year_low = $13,
    market_cap = $14,
    volume = $15,
    avg_volume = $16,
    updated_at = $17
WHERE
    stock_symbol = $1;
"#;
        sqlx::query(sql)
            .bind(&self.stock_symbol)
            .bind(self.price)
            .bind(self.change)
            .bind(self.change_percent)
            .bind(self.pe_ratio)
            .bind(self.pb_ratio)
            .bind(self.payout_ratio)
            .bind(self.revenue_growth_yoy)
            .bind(self.profit_growth_yoy)
            .bind(self.current_yield)
            .bind(self.avg_yield_5y)
            .bind(self.year_high)
            .bind(self.year_low)
            .bind(self.market_cap)
            .bind(self.volume)
            .bind(self.avg_volume)
            .bind(self.updated_at)
            .execute(&mut **tx)
            .await
            .context("Failed to Stock::update_quote")
    }

    /// 取得所有成分股（依 sector、代碼排序）
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch() -> Result<Vec<Stock>> {
        let sql = r#"
SELECT
    stock_symbol,
    name,
    sector,
    price,
    change,
    change_percent,
    pe_ratio,
    pb_ratio,
    payout_ratio,
    revenue_growth_yoy,
    profit_growth_yoy,
    current_yield,
    avg_yield_5y,
    year_high,
    year_low,
    market_cap,
    volume,
    avg_volume,
    updated_at
FROM
    stocks
ORDER BY
    sector,
    stock_symbol;
"#;
        sqlx::query_as::<_, Stock>(sql)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to Stock::fetch() from database")
    }

    /// 取得單一股票
    ///
    /// # Errors
    /// 當查詢失敗或該股票不存在時回傳錯誤。
    pub async fn fetch_one(stock_symbol: &str) -> Result<Stock> {
        let sql = r#"
SELECT
    stock_symbol,
    name,
    sector,
    price,
    change,
    change_percent,
    pe_ratio,
    pb_ratio,
    payout_ratio,
    revenue_growth_yoy,
    profit_growth_yoy,
    current_yield,
    avg_yield_5y,
    year_high,
    year_low,
    market_cap,
    volume,
    avg_volume,
    updated_at
FROM
    stocks
WHERE
    stock_symbol = $1;
"#;
        sqlx::query_as::<_, Stock>(sql)
            .bind(stock_symbol)
            .fetch_one(database::get_connection())
            .await
            .context("Failed to Stock::fetch_one() from database")
    }
}

impl Default for Stock {
    fn default() -> Self {
        Stock::new(String::new())
    }
}

impl From<&declare::Constituent> for Stock {
    fn from(c: &declare::Constituent) -> Self {
        let mut stock = Stock::new(c.stock_symbol.to_string());
        stock.name = c.name.to_string();
        stock.sector = c.sector.name().to_string();
        stock
    }
}

impl Keyable for Stock {
    fn key(&self) -> String {
        self.stock_symbol.clone()
    }

    fn key_with_prefix(&self) -> String {
        format!("Stock:{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_fetch() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 Stock::fetch".to_string());

        match Stock::fetch().await {
            Ok(stocks) => {
                for e in stocks {
                    logging::debug_file_async(format!("{:?} ", e));
                }
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch because {:?}", why));
            }
        }

        logging::debug_file_async("結束 Stock::fetch".to_string());
    }

    #[tokio::test]
    #[ignore]
    async fn test_upsert_metadata() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 Stock::upsert_metadata".to_string());

        let stock = Stock::from(&declare::SETHD30[0]);
        match stock.upsert_metadata().await {
            Ok(_) => {
                logging::debug_file_async(format!("upsert {} 完成", stock.stock_symbol));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to upsert because {:?}", why));
            }
        }

        logging::debug_file_async("結束 Stock::upsert_metadata".to_string());
    }
}
