use std::{env, future::Future};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::{
    backfill::{dividend, market_index, quote},
    bot, event, logging,
    util::datetime::{self, Weekend},
};

/// 啟動排程
///
/// # Errors
/// 當任一排程任務註冊失敗時回傳錯誤。
pub async fn start(sched: &JobScheduler) -> Result<()> {
    run_cron(sched).await?;

    let msg = format!(
        "SETHD Vision 已啟動\r\nRust OS/Arch: {}/{}\r\n",
        env::consts::OS,
        env::consts::ARCH
    );

    bot::telegram::send(&msg).await
}

async fn run_cron(sched: &JobScheduler) -> std::result::Result<(), JobSchedulerError> {
    //                 sec  min  hour  day of month  month  day of week
    // cron 以 UTC 計，曼谷時間 = UTC+7

    let jobs = vec![
        // 交易時段（曼谷 10:00 ~ 16:40）每 2 分鐘更新成分股報價，更新完接著跑警示
        create_job("0 */2 3-9 * * *", || async {
            if datetime::bangkok_now().is_weekend() {
                return Ok(());
            }

            quote::execute().await?;
            event::ticker::execute().await
        }),
        // 交易時段每 5 分鐘更新 SET 大盤指數
        create_job("30 */5 3-9 * * *", || async {
            if datetime::bangkok_now().is_weekend() {
                return Ok(());
            }

            market_index::execute().await
        }),
        // 05:00 (曼谷) 回補配息歷史
        create_job("0 0 22 * * *", dividend::execute),
    ];

    for job in jobs.into_iter().flatten() {
        sched.add(job).await?;
    }

    sched.start().await
}

fn create_job<F, Fut>(cron_expr: &'static str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    cron_expr, why
                ));
            }
        })
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_run() {
        dotenv::dotenv().ok();

        let sched = JobScheduler::new().await.unwrap();
        let every_minute = Job::new_async("* * * * * *", |_uuid, _l| {
            Box::pin(async move {
                logging::debug_file_async(format!("now: {:?}", chrono::Local::now()));
            })
        })
        .unwrap();
        sched.add(every_minute).await.unwrap();
        sched.start().await.unwrap();
    }
}
