/// 配息歷史回補
pub mod dividend;
/// SET 大盤指數更新
pub mod market_index;
/// 成分股報價與基本面更新
pub mod quote;
