use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use sqlx::postgres::PgQueryResult;

use crate::database;

/// SET 大盤摘要，key/value 小表，每次指數更新整批覆寫。
///
/// 目前使用的 key：set_index、set_change、set_change_percent、
/// set_year_high、set_year_low。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct MarketSummary {
    pub key: String,
    pub value: f64,
    pub description: String,
    pub updated_at: DateTime<Local>,
}

impl MarketSummary {
    pub fn new(key: &str, value: f64, description: &str) -> Self {
        MarketSummary {
            key: key.to_string(),
            value,
            description: description.to_string(),
            updated_at: Local::now(),
        }
    }

    /// key 衝突時覆寫 value 與 updated_at
    ///
    /// # Errors
    /// 當資料庫寫入失敗時回傳錯誤。
    pub async fn upsert(&self) -> Result<PgQueryResult> {
        let sql = r#"
INSERT INTO market_summary (key, value, description, updated_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (key) DO UPDATE SET
    value = EXCLUDED.value,
    description = EXCLUDED.description,
    updated_at = EXCLUDED.updated_at;
"#;
        sqlx::query(sql)
            .bind(&self.key)
            .bind(self.value)
            .bind(&self.description)
            .bind(self.updated_at)
            .execute(database::get_connection())
            .await
            .context("Failed to MarketSummary::upsert")
    }

    /// 取得全部摘要
    ///
    /// # Errors
    /// 當查詢失敗時回傳錯誤。
    pub async fn fetch() -> Result<Vec<MarketSummary>> {
        let sql = r#"
SELECT
    key,
    value,
    description,
    updated_at
FROM
    market_summary;
"#;
        sqlx::query_as::<_, MarketSummary>(sql)
            .fetch_all(database::get_connection())
            .await
            .context("Failed to MarketSummary::fetch from database")
    }
}

/// 把摘要列轉成 key -> value 的對照表，儀表板直接取用
pub fn vec_to_hashmap(entities: Vec<MarketSummary>) -> HashMap<String, f64> {
    let mut map = HashMap::with_capacity(entities.len());
    for e in entities {
        map.insert(e.key.clone(), e.value);
    }
    map
}
