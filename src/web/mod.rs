use anyhow::Result;

use crate::{config, logging};

pub mod routes;

/// 啟動儀表板 API，會一直服務到行程結束
///
/// # Errors
/// 當埠號無法綁定或伺服器異常結束時回傳錯誤。
pub async fn serve() -> Result<()> {
    let router = routes::api_routes();
    let addr = format!("0.0.0.0:{}", config::SETTINGS.system.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    logging::info_file_async(format!("dashboard API listening on {}", addr));

    axum::serve(listener, router).await?;

    Ok(())
}
