use std::cmp::Ordering;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::{
    bot, cache,
    database::table::{
        dividend_history::DividendHistory, market_news::MarketNews, stock::Stock,
        ticker_alert::TickerAlert,
    },
    declare::{AlertKind, AlertSeverity},
    logging,
    util::map::Keyable,
};

/// 漲跌幅警示門檻(%)
const PRICE_MOVE_THRESHOLD: f64 = 5.0;
/// 漲跌幅升級成 critical 的門檻(%)
const PRICE_MOVE_CRITICAL: f64 = 10.0;
/// 高殖利率門檻(%)
const HIGH_YIELD_THRESHOLD: f64 = 6.0;
/// 成交量爆增的倍數門檻
const VOLUME_SPIKE_RATIO: f64 = 3.0;

/// 跑馬燈排序方式。
///
/// 即時警示用嚴重度排序，合併新聞與配息快訊的清單用時間排序，
/// 兩種排序同時存在是刻意的，由呼叫端指定而不是寫死。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlertOrder {
    /// 嚴重度高者在前，同嚴重度比漲跌幅絕對值
    SeverityThenMagnitude,
    /// 時間新者在前
    Recency,
}

/// 跑馬燈上的一則訊息
#[derive(Debug, Clone, Serialize)]
pub struct TickerItem {
    pub kind: AlertKind,
    pub stock_symbol: String,
    pub message: String,
    pub value: Option<f64>,
    pub change_percent: Option<f64>,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Local>,
}

impl Keyable for TickerItem {
    fn key(&self) -> String {
        format!("{}:{}", self.stock_symbol, self.kind)
    }

    fn key_with_prefix(&self) -> String {
        format!("Alert:{}", self.key())
    }
}

/// 警示產生器的輸入，一檔股票的即時快照
#[derive(Debug, Clone)]
pub struct StockSnapshot {
    pub stock_symbol: String,
    pub price: f64,
    pub change_percent: f64,
    pub current_yield: f64,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
}

impl From<&Stock> for StockSnapshot {
    fn from(stock: &Stock) -> Self {
        StockSnapshot {
            stock_symbol: stock.stock_symbol.clone(),
            price: stock.price.to_f64().unwrap_or(0.0),
            change_percent: stock.change_percent,
            current_yield: stock.current_yield,
            volume: stock.volume,
            avg_volume: stock.avg_volume,
        }
    }
}

/// 依門檻規則從即時快照產生警示，每條規則獨立判斷、可同時命中。
///
/// 回傳的清單已依 [`AlertOrder::SeverityThenMagnitude`] 排好。
pub fn generate(snapshots: &[StockSnapshot], now: DateTime<Local>) -> Vec<TickerItem> {
    let mut items = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        // 1. 大漲
        if snapshot.change_percent >= PRICE_MOVE_THRESHOLD {
            items.push(TickerItem {
                kind: AlertKind::PriceSurge,
                stock_symbol: snapshot.stock_symbol.clone(),
                message: format!("大漲 {:.2}%", snapshot.change_percent),
                value: Some(snapshot.price),
                change_percent: Some(snapshot.change_percent),
                severity: if snapshot.change_percent >= PRICE_MOVE_CRITICAL {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::Warning
                },
                timestamp: now,
            });
        }

        // 2. 大跌
        if snapshot.change_percent <= -PRICE_MOVE_THRESHOLD {
            items.push(TickerItem {
                kind: AlertKind::PriceDrop,
                stock_symbol: snapshot.stock_symbol.clone(),
                message: format!("大跌 {:.2}%", snapshot.change_percent.abs()),
                value: Some(snapshot.price),
                change_percent: Some(snapshot.change_percent),
                severity: if snapshot.change_percent <= -PRICE_MOVE_CRITICAL {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::Warning
                },
                timestamp: now,
            });
        }

        // 3. 高殖利率
        if snapshot.current_yield >= HIGH_YIELD_THRESHOLD {
            items.push(TickerItem {
                kind: AlertKind::HighYield,
                stock_symbol: snapshot.stock_symbol.clone(),
                message: format!("高殖利率 {:.2}%", snapshot.current_yield),
                value: Some(snapshot.current_yield),
                change_percent: None,
                severity: AlertSeverity::Info,
                timestamp: now,
            });
        }

        // 4. 成交量爆增（有量能數據時才判斷）
        if let (Some(volume), Some(avg_volume)) = (snapshot.volume, snapshot.avg_volume) {
            if avg_volume > 0 && volume as f64 > avg_volume as f64 * VOLUME_SPIKE_RATIO {
                items.push(TickerItem {
                    kind: AlertKind::VolumeSpike,
                    stock_symbol: snapshot.stock_symbol.clone(),
                    message: format!(
                        "成交量爆增 {:.0}%",
                        volume as f64 / avg_volume as f64 * 100.0
                    ),
                    value: None,
                    change_percent: None,
                    severity: AlertSeverity::Warning,
                    timestamp: now,
                });
            }
        }
    }

    sort_items(&mut items, AlertOrder::SeverityThenMagnitude);

    items
}

/// 依指定的排序方式重排警示清單
pub fn sort_items(items: &mut [TickerItem], order: AlertOrder) {
    match order {
        AlertOrder::SeverityThenMagnitude => {
            items.sort_by(|a, b| {
                let severity = b.severity.rank().cmp(&a.severity.rank());
                if severity != Ordering::Equal {
                    return severity;
                }

                let a_change = a.change_percent.unwrap_or(0.0).abs();
                let b_change = b.change_percent.unwrap_or(0.0).abs();
                b_change.total_cmp(&a_change)
            });
        }
        AlertOrder::Recency => {
            items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
    }
}

/// 抓取循環結束後執行：產生警示、去抖動、入庫，critical 的再推播。
///
/// # Errors
/// 只有讀取股票主檔失敗時回傳錯誤；單筆警示的入庫或推播失敗
/// 記錄後繼續處理下一筆。
pub async fn execute() -> Result<()> {
    let stocks = Stock::fetch().await?;
    let snapshots: Vec<StockSnapshot> = stocks.iter().map(StockSnapshot::from).collect();
    let items = generate(&snapshots, Local::now());

    for item in items {
        let cache_key = item.key_with_prefix();
        if cache::TTL.contains(&cache_key) {
            continue;
        }

        cache::TTL.set(cache_key, item.message.clone());

        let record = TickerAlert {
            stock_symbol: item.stock_symbol.clone(),
            alert_type: item.kind.to_string(),
            message: item.message.clone(),
            value: item.value,
            change_percent: item.change_percent,
            severity: item.severity.to_string(),
            created_at: item.timestamp,
        };

        if let Err(why) = record.insert().await {
            logging::error_file_async(format!("Failed to insert ticker_alert because {:?}", why));
        }

        if item.severity == AlertSeverity::Critical {
            let stock_name = cache::SHARE
                .get_stock(&item.stock_symbol)
                .map_or_else(String::new, |stock| stock.name);
            let msg = format!("{} {} {}", item.stock_symbol, stock_name, item.message);

            if let Err(why) = bot::telegram::send(&msg).await {
                logging::error_file_async(format!(
                    "Failed to telegram::send because: {:?}",
                    why
                ));
            }
        }
    }

    Ok(())
}

/// 合併即時警示、新聞快訊、近期配息與警示歷史成一條跑馬燈，
/// 依時間新到舊排序。
///
/// 輔助來源讀取失敗時記錄後以空清單代替，不讓整條跑馬燈開天窗。
///
/// # Errors
/// 只有讀取股票主檔失敗時回傳錯誤。
pub async fn merged_feed(limit: usize) -> Result<Vec<TickerItem>> {
    let stocks = Stock::fetch().await?;
    let snapshots: Vec<StockSnapshot> = stocks.iter().map(StockSnapshot::from).collect();
    let mut items = generate(&snapshots, Local::now());

    match MarketNews::fetch_recent(5).await {
        Ok(news) => {
            for n in news {
                items.push(TickerItem {
                    kind: AlertKind::NewsFlash,
                    stock_symbol: n.stock_symbol.unwrap_or_else(|| "市場".to_string()),
                    message: n.title,
                    value: None,
                    change_percent: None,
                    severity: if n.news_type == "regulatory" {
                        AlertSeverity::Warning
                    } else {
                        AlertSeverity::Info
                    },
                    timestamp: n.published_at,
                });
            }
        }
        Err(why) => {
            logging::error_file_async(format!("Failed to fetch news alerts because {:?}", why));
        }
    }

    match DividendHistory::fetch_recent(7, 10).await {
        Ok(dividends) => {
            for d in dividends {
                let timestamp = d
                    .ex_date
                    .and_time(NaiveTime::MIN)
                    .and_local_timezone(Local)
                    .earliest()
                    .unwrap_or_else(Local::now);

                items.push(TickerItem {
                    kind: AlertKind::Dividend,
                    stock_symbol: d.stock_symbol.clone(),
                    message: format!("配息 ฿{} (除息日 {})", d.amount, d.ex_date),
                    value: d.amount.to_f64(),
                    change_percent: None,
                    severity: AlertSeverity::Info,
                    timestamp,
                });
            }
        }
        Err(why) => {
            logging::error_file_async(format!("Failed to fetch dividend alerts because {:?}", why));
        }
    }

    match TickerAlert::fetch_recent(limit as i64).await {
        Ok(history) => {
            for h in history {
                items.push(TickerItem {
                    kind: AlertKind::from_str(&h.alert_type).unwrap_or(AlertKind::NewsFlash),
                    stock_symbol: h.stock_symbol,
                    message: h.message,
                    value: h.value,
                    change_percent: h.change_percent,
                    severity: AlertSeverity::from_str(&h.severity).unwrap_or(AlertSeverity::Info),
                    timestamp: h.created_at,
                });
            }
        }
        Err(why) => {
            logging::error_file_async(format!("Failed to fetch recent alerts because {:?}", why));
        }
    }

    sort_items(&mut items, AlertOrder::Recency);
    items.truncate(limit);

    Ok(items)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn snapshot(stock_symbol: &str, change_percent: f64, current_yield: f64) -> StockSnapshot {
        StockSnapshot {
            stock_symbol: stock_symbol.to_string(),
            price: 34.5,
            change_percent,
            current_yield,
            volume: None,
            avg_volume: None,
        }
    }

    #[test]
    fn test_surge_critical() {
        let items = generate(&[snapshot("PTT", 12.0, 0.0)], Local::now());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, AlertKind::PriceSurge);
        assert_eq!(items[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_small_move_yields_nothing() {
        let items = generate(&[snapshot("PTT", 3.0, 0.0)], Local::now());
        assert!(items.is_empty());
    }

    #[test]
    fn test_drop_warning() {
        let items = generate(&[snapshot("SCB", -6.0, 0.0)], Local::now());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, AlertKind::PriceDrop);
        assert_eq!(items[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_high_yield_info() {
        let items = generate(&[snapshot("TISCO", 0.0, 7.8)], Local::now());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, AlertKind::HighYield);
        assert_eq!(items[0].severity, AlertSeverity::Info);
    }

    #[test]
    fn test_volume_spike() {
        let mut s = snapshot("COM7", 0.0, 0.0);
        s.volume = Some(4_000_000);
        s.avg_volume = Some(1_000_000);

        let items = generate(&[s], Local::now());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, AlertKind::VolumeSpike);
    }

    #[test]
    fn test_rules_not_mutually_exclusive() {
        // 大漲與高殖利率可以同時命中
        let items = generate(&[snapshot("BCP", 6.0, 6.5)], Local::now());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_severity_then_magnitude_order() {
        let snapshots = vec![
            snapshot("A", 6.0, 0.0),   // warning
            snapshot("B", 12.0, 0.0),  // critical
            snapshot("C", -8.0, 0.0),  // warning，跌幅較大
            snapshot("D", 0.0, 7.0),   // info
        ];

        let items = generate(&snapshots, Local::now());
        let symbols: Vec<&str> = items.iter().map(|i| i.stock_symbol.as_str()).collect();

        assert_eq!(symbols, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_recency_order() {
        let now = Local::now();
        let mut items = generate(&[snapshot("A", 6.0, 0.0)], now - TimeDelta::hours(1));
        items.extend(generate(&[snapshot("B", 6.0, 0.0)], now));

        sort_items(&mut items, AlertOrder::Recency);

        assert_eq!(items[0].stock_symbol, "B");
        assert_eq!(items[1].stock_symbol, "A");
    }
}
