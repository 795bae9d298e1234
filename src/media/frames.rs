use super::MediaOps;
use super::types::TimeRange;
use crate::error::{MediaError, Result};
use crate::tools::{OutputMode, ensure_directory_exists, scan_files_with_extension};
use log::{debug, error};
use std::path::Path;

impl MediaOps {
    /// 依指定幀率擷取區間內的畫面，輸出為 `out_dir/1.jpg`, `out_dir/2.jpg`, ...
    ///
    /// 回傳 ffmpeg 結束碼。
    pub fn extract_frames(
        &self,
        path: &Path,
        range: TimeRange,
        fps: f64,
        out_dir: &Path,
    ) -> Result<i32> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(MediaError::InvalidArgument(format!(
                "fps 必須為正數: {fps}"
            )));
        }

        ensure_directory_exists(out_dir)?;

        let command = self.builder.extract_frames(path, range, fps, out_dir);
        let result = self.runner.run(&command, OutputMode::Capture)?;

        if result.success() {
            let frames = scan_files_with_extension(out_dir, "jpg");
            debug!(
                "{}已擷取 {} 張畫面到 {}",
                self.session(),
                frames.len(),
                out_dir.display()
            );
        } else {
            error!(
                "{}擷取畫面失敗 {} (status {}): {}",
                self.session(),
                path.display(),
                result.status,
                result.stderr_text()
            );
        }

        Ok(result.status)
    }
}
