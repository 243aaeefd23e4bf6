use std::str::FromStr;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

/// 數字欄位常見的雜訊字元（泰銖符號、百分比、千分位等）
const NUMBER_ESCAPE_CHAR: &[char] = &['฿', '%', ',', ' ', '"', '\n'];

/// Parses a decimal value from a given string.
///
/// The string may contain thousands separators, a currency sign or other
/// escape characters; those are stripped before parsing.
///
/// # Errors
/// 當清理後的字串仍無法轉成 `Decimal` 時回傳錯誤。
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Parses an `f64` value from a given string, stripping escape characters first.
///
/// # Errors
/// 當清理後的字串仍無法轉成 `f64` 時回傳錯誤。
pub fn parse_f64(s: &str, escape_chars: Option<Vec<char>>) -> Result<f64> {
    let cleaned = clean_escape_chars(s, escape_chars);
    f64::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as f64 because {:?}", cleaned, why))
}

/// Parses an `i32` value from a given string, stripping escape characters first.
///
/// # Errors
/// 當清理後的字串仍無法轉成 `i32` 時回傳錯誤。
pub fn parse_i32(s: &str, escape_chars: Option<Vec<char>>) -> Result<i32> {
    let cleaned = clean_escape_chars(s, escape_chars);
    i32::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as i32 because {:?}", cleaned, why))
}

/// 去除預設與呼叫端額外指定的雜訊字元
fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut cleaned: String = s
        .chars()
        .filter(|c| !NUMBER_ESCAPE_CHAR.contains(c))
        .collect();

    if let Some(chars) = escape_chars {
        cleaned = cleaned.chars().filter(|c| !chars.contains(c)).collect();
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1,234.56", None).unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("฿34.50", None).unwrap(), dec!(34.50));
        assert_eq!(
            parse_decimal("(2.1)", Some(vec!['(', ')'])).unwrap(),
            dec!(2.1)
        );
        assert!(parse_decimal("n/a", None).is_err());
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("5.82%", None).unwrap(), 5.82);
        assert_eq!(parse_f64("-1,000.5", None).unwrap(), -1000.5);
    }

    #[test]
    fn test_parse_i32() {
        assert_eq!(parse_i32("2,026", None).unwrap(), 2026);
        assert!(parse_i32("", None).is_err());
    }
}
