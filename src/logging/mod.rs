use std::{fmt, thread};

use chrono::{DateTime, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("sethd_vision"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
        };
        write!(f, "{}", name)
    }
}

pub struct Logger {
    writer: Sender<LogMessage>,
}

impl Logger {
    fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<LogMessage>();
        let pattern = format!("log/%Y-%m-%d-{}.log", log_name);

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut rotate = rotate::Rotate::new(pattern);
            let mut batch = String::with_capacity(4096);

            while let Ok(received) = rx.recv() {
                batch.push_str(
                    concat_string!(
                        received.created_at.format("%F %X%.6f").to_string(),
                        " ",
                        received.level.to_string(),
                        " ",
                        received.msg,
                        "\r\n"
                    )
                    .as_str(),
                );

                if rx.is_empty() || batch.len() >= 4096 {
                    if let Err(why) = rotate.write_msg(Local::now(), batch.as_bytes()) {
                        error_console(format!("Failed to write log because {:?}", why));
                        error_console(batch.clone());
                    }
                    batch.clear();
                }
            }
        });

        Logger { writer: tx }
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub fn debug_file_async(log: String) {
    LOGGER.send(Level::Debug, log);
}

pub fn info_file_async(log: String) {
    LOGGER.send(Level::Info, log);
}

pub fn warn_file_async(log: String) {
    LOGGER.send(Level::Warn, log);
}

pub fn error_file_async(log: String) {
    LOGGER.send(Level::Error, log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}
