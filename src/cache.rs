//! 全域快取模組。
//!
//! 1. [`SHARE`]：長生命週期的業務資料快取，放成分股主檔，啟動時載入，
//!    抓取循環更新後同步回寫。
//! 2. [`TTL`]：短生命週期的暫存快取，用來避免同一個警示在每個抓取循環
//!    重複入庫、重複通知。
//!
//! 以 `RwLock` 保護共享資料；若鎖取得失敗，API 回傳 `None` 或預設值，
//! 由上層依回傳值決定是否重試或降級處理。

use std::{collections::HashMap, sync::RwLock, time::Duration};

use moka::sync::Cache;
use once_cell::sync::Lazy;

use crate::{database::table::stock::Stock, logging, util::map::Keyable};

/// 全域共享資料快取實例，服務啟動時先呼叫 [`Share::load`] 再讀取。
pub static SHARE: Lazy<Share> = Lazy::new(Default::default);

/// 警示去抖動用的 TTL 快取，預設存活 4 小時
pub static TTL: Lazy<ShareTTL> = Lazy::new(Default::default);

pub struct Share {
    /// 成分股主檔，key 為股票代碼
    stocks: RwLock<HashMap<String, Stock>>,
}

impl Share {
    pub fn new() -> Self {
        Share {
            stocks: RwLock::new(HashMap::new()),
        }
    }

    /// 從資料庫載入成分股主檔
    pub async fn load(&self) {
        match Stock::fetch().await {
            Ok(stocks) => {
                if let Ok(mut cache) = self.stocks.write() {
                    cache.clear();
                    for stock in stocks {
                        cache.insert(stock.key(), stock);
                    }
                    logging::info_file_async(format!("stocks cache loaded, {} rows", cache.len()));
                }
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to load stocks cache because {:?}", why));
            }
        }
    }

    /// 取得單一股票的快取副本
    pub fn get_stock(&self, stock_symbol: &str) -> Option<Stock> {
        match self.stocks.read() {
            Ok(cache) => cache.get(stock_symbol).cloned(),
            Err(_) => None,
        }
    }

    /// 更新或寫入一筆股票快取
    pub fn set_stock(&self, stock: Stock) {
        match self.stocks.write() {
            Ok(mut cache) => {
                cache.insert(stock.key(), stock);
            }
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to write stocks cache because {:?}",
                    why
                ));
            }
        }
    }
}

impl Default for Share {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ShareTTL {
    cache: Cache<String, String>,
}

impl ShareTTL {
    pub fn new() -> Self {
        ShareTTL {
            cache: Cache::builder()
                .max_capacity(4096)
                .time_to_live(Duration::from_secs(60 * 60 * 4))
                .build(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.get(key).is_some()
    }

    pub fn set(&self, key: String, value: String) {
        self.cache.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }
}

impl Default for ShareTTL {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_cache() {
        TTL.set("Alert:PTT:price_surge".to_string(), "12.5".to_string());
        assert!(TTL.contains("Alert:PTT:price_surge"));
        assert!(!TTL.contains("Alert:PTT:price_drop"));
        assert_eq!(TTL.get("Alert:PTT:price_surge").unwrap(), "12.5");
    }

    #[test]
    fn test_share_stock_roundtrip() {
        let mut stock = Stock::new("PTT".to_string());
        stock.name = "PTT Public Company".to_string();
        SHARE.set_stock(stock);

        let cached = SHARE.get_stock("PTT").unwrap();
        assert_eq!(cached.name, "PTT Public Company");
        assert!(SHARE.get_stock("NOPE").is_none());
    }
}
