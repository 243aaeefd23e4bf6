use anyhow::Result;
use tokio_cron_scheduler::JobScheduler;

pub mod backfill;
pub mod bot;
pub mod cache;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod util;
pub mod web;

use crate::cache::SHARE;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        logging::error_console("Failed to install default crypto provider".to_string());
    }

    SHARE.load().await;

    let sched = JobScheduler::new().await?;
    scheduler::start(&sched).await?;

    web::serve().await
}
