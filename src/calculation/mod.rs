/// 交易時段過濾（上午盤、午休缺口、下午盤）
pub mod session;
/// 估值評分
pub mod valuation;
