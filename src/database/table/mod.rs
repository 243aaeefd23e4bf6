/// 股息發放紀錄
pub mod dividend_history;
/// 市場新聞（僅讀取，無寫入來源）
pub mod market_news;
/// SET 指數摘要 (key/value)
pub mod market_summary;
/// 報價歷史紀錄
pub mod price_log;
/// 成分股主檔與最新報價快照
pub mod stock;
/// 跑馬燈警示歷史
pub mod ticker_alert;
