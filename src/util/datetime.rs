use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Asia::Bangkok;
use chrono_tz::Tz;

/// A trait representing the weekend concept.
pub trait Weekend {
    /// Returns `true` if the date is on a Saturday or Sunday.
    fn is_weekend(&self) -> bool;
}

impl Weekend for DateTime<Local> {
    fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl Weekend for DateTime<Tz> {
    fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// 目前曼谷當地時間（泰國證交所掛牌時間以此為準）
pub fn bangkok_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Bangkok)
}

/// 將 Unix 時間戳（秒）轉成曼谷當地時間
///
/// 無效的時間戳回傳 `None`，由呼叫端決定捨棄或降級。
pub fn bangkok_from_timestamp(secs: i64) -> Option<DateTime<Tz>> {
    match Bangkok.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(dt) => Some(dt),
        _ => None,
    }
}

/// 當地時間的「自午夜起算分鐘數」，用於交易時段判斷
pub fn minutes_of_day(dt: &DateTime<Tz>) -> u32 {
    dt.hour() * 60 + dt.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bangkok_from_timestamp() {
        // 2026-01-05 10:00:00 +07:00 (Monday)
        let dt = bangkok_from_timestamp(1767582000).unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 0);
        assert!(!dt.is_weekend());
        assert_eq!(minutes_of_day(&dt), 600);
    }

    #[test]
    fn test_weekend() {
        // 2026-01-03 12:00:00 +07:00 (Saturday)
        let dt = bangkok_from_timestamp(1767416400).unwrap();
        assert!(dt.is_weekend());
    }
}
