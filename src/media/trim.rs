use super::MediaOps;
use super::types::TrimOutcome;
use crate::error::{MediaError, Result};
use crate::tools::{OutputMode, default_trim_output};
use log::{error, info};
use std::path::Path;

impl MediaOps {
    /// 擷取 `[start, end)` 片段
    ///
    /// `end` 未指定時使用 ffprobe 取得的影片長度；`output` 未指定時寫到
    /// `<資料夾>/<檔名>_trim_<短 id>.<副檔名>`。
    pub fn trim(
        &self,
        path: &Path,
        start: f64,
        end: Option<f64>,
        output: Option<&Path>,
    ) -> Result<TrimOutcome> {
        let end = match end {
            Some(end) => end,
            None => self.probe_duration(path)? as f64,
        };
        let duration = trim_duration(start, end)?;

        let output = output.map_or_else(|| default_trim_output(path), Path::to_path_buf);

        info!(
            "{}裁切 {} 從 {start}s 起 {duration}s -> {}",
            self.session(),
            path.display(),
            output.display()
        );

        let command = self.builder.trim(path, start, duration, &output);
        let result = self.runner.run(&command, OutputMode::Capture)?;

        if !result.success() {
            error!(
                "{}裁切失敗 {} (status {}): {}",
                self.session(),
                path.display(),
                result.status,
                result.stderr_text()
            );
        }

        Ok(TrimOutcome {
            output,
            status: result.status,
        })
    }
}

/// 片段長度 `end - start`；不允許負的起點或非正的長度
pub fn trim_duration(start: f64, end: f64) -> Result<f64> {
    if !start.is_finite() || start < 0.0 {
        return Err(MediaError::InvalidArgument(format!(
            "起點必須為非負數: {start}"
        )));
    }

    let duration = end - start;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(MediaError::InvalidArgument(format!(
            "結束時間 {end}s 必須大於起點 {start}s"
        )));
    }
    Ok(duration)
}
