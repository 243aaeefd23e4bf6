//! 儀表板 API 的路由與 handlers。

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    backfill,
    calculation::{session, valuation},
    crawler::yahoo,
    database::table::{market_summary, stock::Stock},
    event::ticker,
    logging,
};

/// Build all API routes.
pub fn api_routes() -> Router {
    Router::new()
        .route("/api/chart-data", get(chart_data))
        .route("/api/cron/update-prices", get(update_prices))
        .route("/api/dashboard", get(dashboard))
        .route("/api/alerts", get(alerts))
        .route("/health", get(health))
}

#[derive(Deserialize)]
struct ChartQuery {
    symbol: Option<String>,
}

/// GET /api/chart-data?symbol=PTT — 單檔股票的當日走勢（已過濾成交易時段）
async fn chart_data(Query(query): Query<ChartQuery>) -> (StatusCode, Json<Value>) {
    let symbol = match query.symbol {
        Some(s) if !s.is_empty() => s,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Symbol is required" })),
            );
        }
    };

    match yahoo::chart::visit(&symbol).await {
        Ok(intraday) => {
            let data = session::filter_trading_session(&intraday.points);

            (
                StatusCode::OK,
                Json(json!({
                    "symbol": intraday.provider_symbol,
                    "data": data,
                    "meta": {
                        "currency": intraday.currency,
                        "raw_points": intraday.points.len(),
                    },
                })),
            )
        }
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to fetch chart data({}) because {:?}",
                symbol, why
            ));

            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Failed to fetch chart data",
                    "details": why.to_string(),
                })),
            )
        }
    }
}

/// GET /api/cron/update-prices — 對整份成分股清單跑一輪更新並回報逐檔結果
async fn update_prices() -> (StatusCode, Json<Value>) {
    match backfill::quote::execute().await {
        Ok(outcomes) => {
            if let Err(why) = ticker::execute().await {
                logging::error_file_async(format!("Failed to ticker::execute because {:?}", why));
            }

            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "updated": outcomes.len(),
                    "details": outcomes,
                })),
            )
        }
        Err(why) => {
            logging::error_file_async(format!("Failed to update prices because {:?}", why));

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": why.to_string(),
                })),
            )
        }
    }
}

/// GET /api/dashboard — 儀表板一次性快照：個股 + 估值 + 大盤摘要 + 跑馬燈
async fn dashboard() -> (StatusCode, Json<Value>) {
    let stocks = match Stock::fetch().await {
        Ok(stocks) => stocks,
        Err(why) => {
            logging::error_file_async(format!("Failed to fetch stocks because {:?}", why));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": why.to_string() })),
            );
        }
    };

    let mut advancing = 0;
    let mut declining = 0;
    let mut rows = Vec::with_capacity(stocks.len());

    for stock in &stocks {
        if stock.change_percent > 0.0 {
            advancing += 1;
        } else if stock.change_percent < 0.0 {
            declining += 1;
        }

        let valuation = valuation::calculate(&valuation::ValuationInput::from(stock));

        rows.push(json!({
            "symbol": stock.stock_symbol,
            "name": stock.name,
            "sector": stock.sector,
            "price": stock.price.to_f64(),
            "change": stock.change.to_f64(),
            "change_percent": stock.change_percent,
            "pe_ratio": stock.pe_ratio,
            "pb_ratio": stock.pb_ratio,
            "current_yield": stock.current_yield,
            "avg_yield_5y": stock.avg_yield_5y,
            "year_high": stock.year_high.to_f64(),
            "year_low": stock.year_low.to_f64(),
            "market_cap": stock.market_cap.to_f64(),
            "score": valuation.score,
            "status": valuation.status,
            "fair_value": valuation.fair_value,
            "updated_at": stock.updated_at.to_rfc3339(),
        }));
    }

    // 輔助數據抓不到時以空值降級，儀表板照常出圖
    let summary = market_summary::MarketSummary::fetch()
        .await
        .map(market_summary::vec_to_hashmap)
        .unwrap_or_default();

    let snapshots: Vec<ticker::StockSnapshot> =
        stocks.iter().map(ticker::StockSnapshot::from).collect();
    let live_alerts = ticker::generate(&snapshots, chrono::Local::now());

    let unchanged = stocks.len().saturating_sub(advancing + declining);
    let sentiment = if advancing + declining > 0 {
        advancing as f64 / (advancing + declining) as f64 * 100.0
    } else {
        50.0
    };

    (
        StatusCode::OK,
        Json(json!({
            "stocks": rows,
            "market_summary": summary,
            "sentiment": {
                "advancing": advancing,
                "declining": declining,
                "unchanged": unchanged,
                "score": sentiment,
            },
            "alerts": live_alerts,
        })),
    )
}

#[derive(Deserialize)]
struct AlertsQuery {
    limit: Option<usize>,
}

/// GET /api/alerts?limit=10 — 合併即時警示與輔助快訊，依時間新到舊
async fn alerts(Query(query): Query<AlertsQuery>) -> (StatusCode, Json<Value>) {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    match ticker::merged_feed(limit).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "alerts": items }))),
        Err(why) => {
            logging::error_file_async(format!("Failed to fetch alerts because {:?}", why));

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": why.to_string() })),
            )
        }
    }
}

/// GET /health — simple health check.
async fn health() -> &'static str {
    "ok"
}
