use super::MediaOps;
use super::types::{TileSpec, TimeRange};
use crate::error::{MediaError, Result};
use crate::tools::{CommandResult, OutputMode, ToolCommand, scan_files_with_extension};
use log::{debug, error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

impl MediaOps {
    /// 將資料夾中的 jpg 縮小一半後排成網格預覽圖
    ///
    /// 只有在輸出檔確實存在時回傳 `Some(output)`；網格無效時不啟動 ffmpeg。
    pub fn tile_from_images(
        &self,
        input_dir: &Path,
        output: &Path,
        tile: TileSpec,
    ) -> Result<Option<PathBuf>> {
        tile.validate()?;
        let images = scan_files_with_extension(input_dir, "jpg");
        if images.is_empty() {
            warn!("{}{} 中沒有 jpg 圖片", self.session(), input_dir.display());
        } else {
            debug!(
                "{}以 {} 張圖片建立 {tile} 預覽圖",
                self.session(),
                images.len()
            );
        }

        let command = self.builder.tile_from_images(input_dir, tile, output);
        self.run_preview(&command, output)
    }

    /// 在影片區間內平均取樣，排成網格預覽圖
    ///
    /// 起點小於 0 會歸零；區間短於格數時會往後延長。
    pub fn tile_from_video(
        &self,
        path: &Path,
        range: TimeRange,
        output: &Path,
        tile: TileSpec,
    ) -> Result<Option<PathBuf>> {
        tile.validate()?;
        let window = range.normalized_for_tiles(tile);
        debug!(
            "{}{} 預覽區間 {:.3}s-{:.3}s, fps={:.4}",
            self.session(),
            path.display(),
            window.start,
            window.end,
            window.sampling_rate(tile)
        );

        let command = self.builder.tile_from_video(path, range, tile, output);
        self.run_preview(&command, output)
    }

    fn run_preview(&self, command: &ToolCommand, output: &Path) -> Result<Option<PathBuf>> {
        // 先移除舊檔，避免失敗時誤判為成功
        match fs::remove_file(output) {
            Ok(()) => debug!("{}已移除舊的預覽圖 {}", self.session(), output.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(MediaError::Io {
                    path: output.to_path_buf(),
                    source,
                });
            }
        }

        let result = self.runner.run(command, OutputMode::Capture)?;
        Ok(self.check_preview_output(&result, output))
    }

    fn check_preview_output(&self, result: &CommandResult, output: &Path) -> Option<PathBuf> {
        if output.exists() {
            info!("{}預覽圖已建立: {}", self.session(), output.display());
            return Some(output.to_path_buf());
        }

        error!(
            "{}預覽圖未建立 {} (status {}): {}",
            self.session(),
            output.display(),
            result.status,
            result.stderr_text()
        );
        None
    }
}
