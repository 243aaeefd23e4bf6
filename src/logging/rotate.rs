use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeDelta};
use rayon::prelude::*;

use crate::logging;

/// 預設單檔最大大小：10 MB
const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;
/// 預設保留天數：7 天
const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// 依日期與檔案大小輪轉的日誌寫入器
pub struct Rotate {
    /// 檔名模式，例如 "log/%Y-%m-%d-name.log"
    fn_pattern: String,
    /// 當前基礎檔名（不含 generation，由日期決定）
    cur_base_fn: String,
    /// 檔案輸出 handle
    out_fh: Option<BufWriter<File>>,
    /// 當前世代編號 (0, 1, 2, ...)，只增不減
    generation: u32,
    /// 單檔最大大小 (bytes)
    max_size: u64,
    /// 當前檔案已寫入大小
    current_size: u64,
    /// 日誌保留時間
    max_age: TimeDelta,
}

impl Rotate {
    pub fn new(fn_pattern: String) -> Self {
        Self::with_options(fn_pattern, DEFAULT_MAX_SIZE, DEFAULT_MAX_AGE_DAYS)
    }

    pub fn with_options(fn_pattern: String, max_size: u64, max_age_days: i64) -> Self {
        Rotate {
            fn_pattern,
            cur_base_fn: String::new(),
            out_fh: None,
            generation: 0,
            max_size,
            current_size: 0,
            max_age: TimeDelta::try_days(max_age_days).unwrap_or(TimeDelta::days(7)),
        }
    }

    /// 寫入日誌訊息，自動處理日期切換、大小檢查與世代輪轉
    ///
    /// # Errors
    /// 當日誌檔無法開啟或寫入失敗時回傳錯誤。
    pub fn write_msg(&mut self, now: DateTime<Local>, msg: &[u8]) -> Result<()> {
        let base_fn = now.format(&self.fn_pattern).to_string();

        // 日期變更：重設 generation
        if base_fn != self.cur_base_fn {
            self.generation = 0;
            self.current_size = 0;
            self.cur_base_fn = base_fn;
            self.open_new_file()?;
            self.cleanup_old_files(now);
        }

        if self.current_size + msg.len() as u64 > self.max_size {
            self.rotate_generation()?;
        }

        match self.out_fh {
            Some(ref mut writer) => {
                writer.write_all(msg)?;
                writer.flush()?;
                self.current_size += msg.len() as u64;
                Ok(())
            }
            None => Err(anyhow!("Log writer is not open")),
        }
    }

    /// 產生完整檔名（含 generation）
    ///
    /// generation = 0: "log/2026-02-03-app.log"
    /// generation = 1: "log/2026-02-03-app.1.log"
    fn generate_full_fn(&self, base_fn: &str, generation: u32) -> String {
        if generation == 0 {
            return base_fn.to_string();
        }

        let path = Path::new(base_fn);
        let parent = path.parent().unwrap_or(Path::new(""));
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("log");

        parent
            .join(format!("{}.{}.{}", stem, generation, ext))
            .to_string_lossy()
            .to_string()
    }

    fn open_new_file(&mut self) -> Result<()> {
        self.flush_current();

        let filename = self.generate_full_fn(&self.cur_base_fn, self.generation);

        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.out_fh = Some(BufWriter::with_capacity(4096, file));

        Ok(())
    }

    /// 執行世代輪轉（因大小超限），世代只增不減，不覆蓋舊檔案
    fn rotate_generation(&mut self) -> Result<()> {
        self.flush_current();
        self.generation += 1;
        self.current_size = 0;
        self.open_new_file()
    }

    fn flush_current(&mut self) {
        if let Some(ref mut writer) = self.out_fh {
            let _ = writer.flush();
        }
    }

    /// 清理超過 max_age 的舊日誌檔
    fn cleanup_old_files(&self, now: DateTime<Local>) {
        let current = self.generate_full_fn(&self.cur_base_fn, self.generation);

        match Self::files_in_directory(&current) {
            Ok(files) => {
                let cut_off = (now - self.max_age).timestamp() as u64;
                let to_unlink: Vec<PathBuf> = files
                    .into_iter()
                    .filter(|file| {
                        fs::metadata(file)
                            .and_then(|metadata| metadata.modified())
                            .ok()
                            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
                            .map(|age| age.as_secs() <= cut_off)
                            .unwrap_or(false)
                    })
                    .collect();

                to_unlink
                    .par_iter()
                    .with_min_len(num_cpus::get())
                    .for_each(|unlink| {
                        if let Err(why) = fs::remove_file(unlink) {
                            logging::error_console(format!(
                                "couldn't remove the file({}). because {:?}",
                                unlink.display(),
                                why
                            ));
                        }
                    });
            }
            Err(why) => {
                logging::error_console(format!("Failed to files_in_directory because {:?}", why));
            }
        }
    }

    fn files_in_directory<P: AsRef<Path>>(file_path: P) -> Result<Vec<PathBuf>, io::Error> {
        let path = file_path.as_ref();
        let parent_dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Parent directory not found"))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            let entry = entry?;
            files.push(entry.path());
        }

        Ok(files)
    }
}

impl Drop for Rotate {
    fn drop(&mut self) {
        self.flush_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_filename() {
        let r = Rotate::new("log/%Y-%m-%d-app.log".to_string());

        let base = "log/2026-02-03-app.log";
        assert_eq!(r.generate_full_fn(base, 0), "log/2026-02-03-app.log");
        assert_eq!(r.generate_full_fn(base, 1), "log/2026-02-03-app.1.log");
        assert_eq!(r.generate_full_fn(base, 2), "log/2026-02-03-app.2.log");
    }

    #[test]
    #[ignore]
    fn test_size_rotation() {
        // 設定很小的檔案大小限制 (1KB) 來測試輪轉
        let mut r = Rotate::with_options("log/%Y-%m-%d-size-test.log".to_string(), 1024, 7);
        let now = Local::now();

        for i in 0..20 {
            let msg = format!("{} Line {} - {}\r\n", now.format("%F %X%.6f"), i, "X".repeat(100));
            r.write_msg(now, msg.as_bytes()).unwrap();
        }

        assert!(r.generation >= 1);
    }
}
