use crate::{database::table::stock::Stock, declare::ValuationStatus};
use rust_decimal::prelude::ToPrimitive;

/// 估值評分的輸入，比率欄位一律為百分比
#[derive(Debug, Clone, Default)]
pub struct ValuationInput {
    pub price: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    /// 目前殖利率(%)
    pub current_yield: f64,
    /// 五年平均殖利率(%)
    pub avg_yield_5y: f64,
    pub revenue_growth_yoy: f64,
    pub profit_growth_yoy: f64,
    pub payout_ratio: f64,
}

/// 估值評分結果
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    /// 0 ~ 100 的綜合分數
    pub score: i32,
    pub status: ValuationStatus,
    /// 以固定 15 倍本益比回推的概略合理價，不是 DCF
    pub fair_value: f64,
}

/// 將基本面數據換算成 0 ~ 100 的價值分數與估值結論。
///
/// 純函數，缺漏或為零的輸入降級成中性的 50 分，不回傳錯誤。
///
/// 權重：殖利率 30%、估值(PE/PB) 20%、成長 30%、配息穩定度 20%，
/// 再依衰退、超額配息、殖利率走低三種情況扣分。
pub fn calculate(input: &ValuationInput) -> Valuation {
    // 殖利率 5% 拿滿分
    let yield_score = f64::min(100.0, input.current_yield / 5.0 * 100.0);

    // 本益比 10 倍拿滿分，超過 30 倍歸零；沒有數據時取中性值
    let pe_score = if input.pe_ratio > 0.0 {
        clamp(100.0 - (input.pe_ratio - 10.0) * 5.0)
    } else {
        50.0
    };
    let pb_score = if input.pb_ratio > 0.0 {
        clamp(100.0 - (input.pb_ratio - 1.0) * 20.0)
    } else {
        50.0
    };
    let valuation_score = (pe_score + pb_score) / 2.0;

    // 營收與獲利年增率合計 10% 拿滿分
    let growth = input.revenue_growth_yoy + input.profit_growth_yoy;
    let growth_score = clamp(growth / 10.0 * 100.0);

    let payout_score = payout_score(input.payout_ratio);

    let mut raw_score = yield_score * 0.3
        + valuation_score * 0.2
        + growth_score * 0.3
        + payout_score * 0.2;

    // 扣分項
    if growth < 0.0 {
        raw_score -= 10.0;
    }
    if input.payout_ratio > 100.0 {
        raw_score -= 15.0;
    }
    if input.current_yield < input.avg_yield_5y {
        raw_score -= 5.0;
    }

    let score = clamp(raw_score).round() as i32;

    // 門檻由嚴到鬆檢查，90 分以上才輪得到 80 分的判斷
    let status = if score >= 90 {
        ValuationStatus::ExtremeCheap
    } else if score >= 80 {
        ValuationStatus::Undervalued
    } else if score <= 40 {
        ValuationStatus::Overvalued
    } else {
        ValuationStatus::Fair
    };

    let pe = if input.pe_ratio > 0.0 {
        input.pe_ratio
    } else {
        15.0
    };
    let eps = input.price / pe;
    let fair_value = (eps * 15.0 * 100.0).round() / 100.0;

    Valuation {
        score,
        status,
        fair_value,
    }
}

/// 盈餘分配率的階梯分數：40 ~ 70% 最理想，超過 90% 視為不可持續
fn payout_score(payout: f64) -> f64 {
    if payout > 0.0 && payout <= 40.0 {
        60.0
    } else if payout > 40.0 && payout <= 70.0 {
        100.0
    } else if payout > 70.0 && payout <= 90.0 {
        60.0
    } else if payout > 90.0 {
        20.0
    } else {
        50.0
    }
}

fn clamp(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

impl From<&Stock> for ValuationInput {
    fn from(stock: &Stock) -> Self {
        ValuationInput {
            price: stock.price.to_f64().unwrap_or(0.0),
            pe_ratio: stock.pe_ratio,
            pb_ratio: stock.pb_ratio,
            current_yield: stock.current_yield,
            avg_yield_5y: stock.avg_yield_5y,
            revenue_growth_yoy: stock.revenue_growth_yoy,
            profit_growth_yoy: stock.profit_growth_yoy,
            payout_ratio: stock.payout_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        current_yield: f64,
        pe_ratio: f64,
        pb_ratio: f64,
        revenue_growth_yoy: f64,
        payout_ratio: f64,
    ) -> ValuationInput {
        ValuationInput {
            price: 34.5,
            pe_ratio,
            pb_ratio,
            current_yield,
            avg_yield_5y: 0.0,
            revenue_growth_yoy,
            profit_growth_yoy: 0.0,
            payout_ratio,
        }
    }

    #[test]
    fn test_payout_score_boundaries() {
        assert_eq!(payout_score(35.0), 60.0);
        assert_eq!(payout_score(55.0), 100.0);
        assert_eq!(payout_score(85.0), 60.0);
        assert_eq!(payout_score(95.0), 20.0);
        assert_eq!(payout_score(0.0), 50.0);
    }

    #[test]
    fn test_perfect_input_scores_100() {
        // 殖利率 5%、PE 10、PB 1、成長 10%、配息 50% 每一項都拿滿分
        let v = calculate(&input(5.0, 10.0, 1.0, 10.0, 50.0));
        assert_eq!(v.score, 100);
        assert_eq!(v.status, ValuationStatus::ExtremeCheap);
    }

    #[test]
    fn test_extreme_cheap_reachable_before_undervalued() {
        // 30 + 20 + 30 + 12 = 92，必須判成 extreme_cheap 而不是 undervalued
        let v = calculate(&input(5.0, 10.0, 1.0, 10.0, 35.0));
        assert_eq!(v.score, 92);
        assert_eq!(v.status, ValuationStatus::ExtremeCheap);
    }

    #[test]
    fn test_undervalued() {
        // 18 + 20 + 30 + 20 = 88
        let v = calculate(&input(3.0, 10.0, 1.0, 10.0, 50.0));
        assert_eq!(v.score, 88);
        assert_eq!(v.status, ValuationStatus::Undervalued);
    }

    #[test]
    fn test_fair() {
        let v = calculate(&input(2.0, 15.0, 1.5, 5.0, 50.0));
        assert_eq!(v.status, ValuationStatus::Fair);
    }

    #[test]
    fn test_missing_inputs_degrade_to_overvalued_midpoints() {
        // 全零輸入：PE/PB/配息取中性 50 分，其他歸零
        let v = calculate(&ValuationInput::default());
        assert_eq!(v.score, 20);
        assert_eq!(v.status, ValuationStatus::Overvalued);
    }

    #[test]
    fn test_penalties() {
        let mut i = input(5.0, 10.0, 1.0, 10.0, 50.0);
        i.revenue_growth_yoy = -7.0;
        i.payout_ratio = 120.0;
        i.avg_yield_5y = 6.0;
        // 30 + 20 + 0 + 4 = 54，扣 10 + 15 + 5 後剩 24
        let v = calculate(&i);
        assert_eq!(v.score, 24);
        assert_eq!(v.status, ValuationStatus::Overvalued);
    }

    #[test]
    fn test_fair_value_with_pe_fallback() {
        // PE <= 0 時以 15 倍回推，合理價等於現價
        let v = calculate(&input(3.0, 0.0, 1.0, 5.0, 50.0));
        assert_eq!(v.fair_value, 34.5);

        let v = calculate(&input(3.0, 10.0, 1.0, 5.0, 50.0));
        assert_eq!(v.fair_value, 51.75);
    }

    #[test]
    fn test_score_always_within_bounds() {
        let yields = [0.0, 2.5, 5.0, 12.0];
        let pes = [-1.0, 0.0, 5.0, 10.0, 25.0, 60.0];
        let pbs = [0.0, 0.5, 1.0, 4.0, 20.0];
        let growths = [-50.0, -5.0, 0.0, 8.0, 30.0];
        let payouts = [0.0, 35.0, 55.0, 85.0, 120.0];

        for y in yields {
            for pe in pes {
                for pb in pbs {
                    for g in growths {
                        for p in payouts {
                            let v = calculate(&input(y, pe, pb, g, p));
                            assert!(
                                (0..=100).contains(&v.score),
                                "score {} out of range for y={} pe={} pb={} g={} p={}",
                                v.score,
                                y,
                                pe,
                                pb,
                                g,
                                p
                            );
                        }
                    }
                }
            }
        }
    }
}
