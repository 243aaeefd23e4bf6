use std::collections::HashMap;

use crate::{declare::ChartPoint, util::datetime};

/// 上午盤窗格（分鐘），官方時段 10:00 ~ 12:30，前後各留 10 分鐘吸收取樣抖動
const MORNING_OPEN: u32 = 9 * 60 + 50;
const MORNING_CLOSE: u32 = 12 * 60 + 40;
/// 下午盤窗格（分鐘），官方時段 14:30 ~ 16:30
const AFTERNOON_OPEN: u32 = 14 * 60 + 20;
const AFTERNOON_CLOSE: u32 = 16 * 60 + 40;
/// 午休缺口占位點的間隔（秒）
const GAP_STEP_SECS: i64 = 600;

/// 把原始取樣序列整理成「最近一個交易日、僅交易時段」的走勢。
///
/// 1. 只留與最新一筆同一個曼谷日期的取樣（週末、假日自然落在上一個交易日）。
/// 2. 只留上午盤或下午盤窗格內的取樣，窗格為閉區間。
/// 3. 相同時間戳只留最後一筆。
/// 4. 上午盤與下午盤之間每 10 分鐘補一個無價格的占位點，
///    走勢圖才會留白而不是把午休直接連成一條線。
///
/// 輸入裡的占位點（price 為 None）會先被丟掉再重新生成，
/// 因此把已過濾的序列再過濾一次會得到一樣的結果。
/// 價格非有限值（NaN/Inf）的取樣直接丟棄。
pub fn filter_trading_session(samples: &[ChartPoint]) -> Vec<ChartPoint> {
    // 佔位點與壞價格先剔除，只處理真實取樣
    let mut dedup: HashMap<i64, f64> = HashMap::with_capacity(samples.len());
    let mut ordered: Vec<i64> = Vec::with_capacity(samples.len());

    for sample in samples {
        let price = match sample.price {
            Some(p) if p.is_finite() => p,
            _ => continue,
        };

        if dedup.insert(sample.time, price).is_none() {
            ordered.push(sample.time);
        }
    }

    let latest = match ordered.iter().max() {
        Some(ts) => *ts,
        None => return Vec::new(),
    };

    let latest_date = match datetime::bangkok_from_timestamp(latest) {
        Some(dt) => dt.date_naive(),
        None => return Vec::new(),
    };

    let mut morning: Vec<ChartPoint> = Vec::new();
    let mut afternoon: Vec<ChartPoint> = Vec::new();

    ordered.sort_unstable();

    for ts in ordered {
        let dt = match datetime::bangkok_from_timestamp(ts) {
            Some(dt) => dt,
            None => continue,
        };

        if dt.date_naive() != latest_date {
            continue;
        }

        let minutes = datetime::minutes_of_day(&dt);
        let point = ChartPoint {
            time: ts,
            price: dedup.get(&ts).copied(),
        };

        if (MORNING_OPEN..=MORNING_CLOSE).contains(&minutes) {
            morning.push(point);
        } else if (AFTERNOON_OPEN..=AFTERNOON_CLOSE).contains(&minutes) {
            afternoon.push(point);
        }
    }

    let mut filtered = Vec::with_capacity(morning.len() + afternoon.len() + 16);

    match (morning.last(), afternoon.first()) {
        (Some(last_morning), Some(first_afternoon)) => {
            let gap_start = last_morning.time;
            let gap_end = first_afternoon.time;

            filtered.extend_from_slice(&morning);

            let mut ts = gap_start + GAP_STEP_SECS;
            while ts < gap_end {
                filtered.push(ChartPoint {
                    time: ts,
                    price: None,
                });
                ts += GAP_STEP_SECS;
            }

            filtered.extend_from_slice(&afternoon);
        }
        // 只有單一時段時不補缺口
        _ => {
            filtered.extend_from_slice(&morning);
            filtered.extend_from_slice(&afternoon);
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Asia::Bangkok;

    use super::*;

    /// 2026-01-05（週一）曼谷時間的 Unix 時間戳
    fn ts(day: u32, hour: u32, min: u32) -> i64 {
        Bangkok
            .with_ymd_and_hms(2026, 1, day, hour, min, 0)
            .unwrap()
            .timestamp()
    }

    fn point(time: i64, price: f64) -> ChartPoint {
        ChartPoint {
            time,
            price: Some(price),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_trading_session(&[]).is_empty());
    }

    #[test]
    fn test_keeps_only_latest_trading_day() {
        let samples = vec![
            point(ts(2, 10, 30), 33.0),
            point(ts(2, 15, 0), 33.5),
            point(ts(5, 10, 30), 34.0),
            point(ts(5, 15, 0), 34.5),
        ];

        let filtered = filter_trading_session(&samples);
        let reals: Vec<&ChartPoint> = filtered.iter().filter(|p| p.price.is_some()).collect();

        assert_eq!(reals.len(), 2);
        assert!(reals.iter().all(|p| p.time >= ts(5, 0, 0)));
    }

    #[test]
    fn test_session_window_boundaries() {
        let samples = vec![
            point(ts(5, 9, 49), 1.0),  // 開盤緩衝之前，剔除
            point(ts(5, 9, 50), 2.0),  // 緩衝邊界，保留
            point(ts(5, 12, 40), 3.0), // 上午盤窗格右界，保留
            point(ts(5, 13, 0), 4.0),  // 午休，剔除
            point(ts(5, 14, 20), 5.0), // 下午盤窗格左界，保留
            point(ts(5, 16, 40), 6.0), // 收盤緩衝邊界，保留
            point(ts(5, 16, 41), 7.0), // 收盤後，剔除
        ];

        let filtered = filter_trading_session(&samples);
        let prices: Vec<f64> = filtered.iter().filter_map(|p| p.price).collect();

        assert_eq!(prices, vec![2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn test_gap_synthesized_between_sessions() {
        let samples = vec![
            point(ts(5, 10, 0), 34.0),
            point(ts(5, 12, 30), 34.2),
            point(ts(5, 14, 30), 34.4),
            point(ts(5, 16, 0), 34.6),
        ];

        let filtered = filter_trading_session(&samples);
        let gaps: Vec<&ChartPoint> = filtered.iter().filter(|p| p.price.is_none()).collect();

        // 12:30 之後每 10 分鐘一個占位點，直到 14:30 之前：12:40 ~ 14:20
        assert_eq!(gaps.len(), 11);
        assert_eq!(gaps.first().unwrap().time, ts(5, 12, 40));
        assert_eq!(gaps.last().unwrap().time, ts(5, 14, 20));

        // 整體序列必須按時間遞增
        let times: Vec<i64> = filtered.iter().map(|p| p.time).collect();
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_no_gap_with_single_session() {
        let samples = vec![point(ts(5, 10, 0), 34.0), point(ts(5, 11, 30), 34.2)];

        let filtered = filter_trading_session(&samples);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.price.is_some()));
    }

    #[test]
    fn test_idempotent() {
        let samples = vec![
            point(ts(5, 10, 0), 34.0),
            point(ts(5, 12, 30), 34.2),
            point(ts(5, 14, 30), 34.4),
            point(ts(5, 16, 0), 34.6),
        ];

        let once = filter_trading_session(&samples);
        let twice = filter_trading_session(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_timestamp_last_write_wins() {
        let samples = vec![
            point(ts(5, 10, 0), 34.0),
            point(ts(5, 10, 0), 35.0),
            point(ts(5, 10, 5), 34.5),
        ];

        let filtered = filter_trading_session(&samples);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].price, Some(35.0));
    }

    #[test]
    fn test_non_finite_price_dropped() {
        let samples = vec![
            point(ts(5, 10, 0), f64::NAN),
            point(ts(5, 10, 5), 34.5),
            ChartPoint {
                time: ts(5, 10, 10),
                price: None,
            },
        ];

        let filtered = filter_trading_session(&samples);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].price, Some(34.5));
    }
}
