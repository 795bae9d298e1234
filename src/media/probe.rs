use super::MediaOps;
use crate::error::{MediaError, Result};
use crate::tools::OutputMode;
use log::{debug, warn};
use std::path::Path;

impl MediaOps {
    /// 使用 ffprobe 取得影片長度（整數秒，無條件捨去）
    ///
    /// 無法啟動、非零結束碼與無法解析的輸出分別回傳不同錯誤，
    /// 不會以 0 秒代表失敗。
    pub fn probe_duration(&self, path: &Path) -> Result<u64> {
        let command = self.builder.probe_duration(path);
        let result = self.runner.run(&command, OutputMode::Capture)?;

        if !result.success() {
            let stderr = result.stderr_text();
            warn!(
                "{}ffprobe 無法讀取 {} (status {}): {}",
                self.session(),
                path.display(),
                result.status,
                stderr
            );
            return Err(MediaError::ProbeFailed {
                status: result.status,
                stderr,
            });
        }

        let seconds = parse_duration_seconds(&result.stdout_text())?;
        debug!("{}{} 長度 {}s", self.session(), path.display(), seconds);
        Ok(seconds)
    }
}

/// 解析 ffprobe 輸出的秒數，例如 `"12.345000\n"` -> 12
///
/// 只取小數點前的部分，不做四捨五入。
pub fn parse_duration_seconds(output: &str) -> Result<u64> {
    let text = output.trim();
    let whole = text.split_once('.').map_or(text, |(whole, _)| whole);

    whole
        .parse::<u64>()
        .map_err(|_| MediaError::MalformedOutput(text.to_string()))
}
