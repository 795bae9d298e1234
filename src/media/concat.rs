use super::MediaOps;
use super::types::ConcatOutcome;
use crate::error::Result;
use crate::tools::{
    OutputMode, default_concat_output, default_merged_output, intermediate_ts_path,
};
use log::{debug, error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

impl MediaOps {
    /// 以 concat 濾鏡重新編碼合併影片
    ///
    /// 適用於幀率或解析度不同的輸入。非零狀態只記錄日誌，
    /// 仍回傳輸出路徑，呼叫端需檢查 `status`。
    pub fn concat_filter(
        &self,
        inputs: &[impl AsRef<Path>],
        has_audio: bool,
        output: Option<&Path>,
    ) -> Result<ConcatOutcome> {
        let Some(first) = inputs.first() else {
            debug!("{}沒有輸入檔，略過 concat filter 合併", self.session());
            return Ok(ConcatOutcome::NoInputs);
        };

        let started = Instant::now();
        let output = output.map_or_else(|| default_concat_output(first.as_ref()), Path::to_path_buf);

        info!(
            "{}concat filter 合併 {} 個影片 (audio: {}) -> {}",
            self.session(),
            inputs.len(),
            has_audio,
            output.display()
        );

        let command = self.builder.concat_filter(inputs, has_audio, &output)?;
        let result = self.runner.run(&command, OutputMode::Capture)?;

        if !result.success() {
            error!(
                "{}concat filter 合併失敗 (status {}): {}",
                self.session(),
                result.status,
                result.stderr_text()
            );
        }

        info!(
            "{}concat filter 合併耗時 {:.2}s",
            self.session(),
            started.elapsed().as_secs_f64()
        );

        Ok(ConcatOutcome::Merged {
            output,
            status: result.status,
        })
    }

    /// 先將每個輸入 stream copy 成 `.ts`，再以 concat 協定串接
    ///
    /// 只適用於編碼參數相同的輸入。本次建立的 `.ts` 檔不論合併成功與否都會刪除；
    /// 資料夾中其他 `.ts` 檔不受影響。
    pub fn concat_transport_stream(
        &self,
        inputs: &[impl AsRef<Path>],
        output: Option<&Path>,
    ) -> Result<ConcatOutcome> {
        let Some(first) = inputs.first() else {
            debug!("{}沒有輸入檔，略過 TS 合併", self.session());
            return Ok(ConcatOutcome::NoInputs);
        };

        let started = Instant::now();
        let output = output.map_or_else(|| default_merged_output(first.as_ref()), Path::to_path_buf);
        let mut intermediates = IntermediateFiles::default();

        for input in inputs {
            let input = input.as_ref();
            let ts_path = intermediate_ts_path(input);
            intermediates.track(ts_path.clone());

            let command = self.builder.transcode_to_transport_stream(input, &ts_path);
            let result = self.runner.run(&command, OutputMode::Capture)?;
            if !result.success() {
                warn!(
                    "{}轉換 TS 失敗 {} (status {}): {}",
                    self.session(),
                    input.display(),
                    result.status,
                    result.stderr_text()
                );
            }
        }

        let command = self
            .builder
            .concat_transport_streams(intermediates.paths(), &output)?;
        let result = self.runner.run(&command, OutputMode::Capture)?;

        if !result.success() {
            error!(
                "{}TS 合併失敗 (status {}): {}",
                self.session(),
                result.status,
                result.stderr_text()
            );
        }

        let removed = intermediates.cleanup();
        info!(
            "{}TS 合併 {} 個影片耗時 {:.2}s，已清理 {} 個中繼檔",
            self.session(),
            inputs.len(),
            started.elapsed().as_secs_f64(),
            removed
        );

        Ok(ConcatOutcome::Merged {
            output,
            status: result.status,
        })
    }
}

/// 本次操作建立的中繼檔清單
///
/// 離開作用域時（包含錯誤提早返回）會刪除所有仍存在的檔案。
#[derive(Debug, Default)]
struct IntermediateFiles {
    paths: Vec<PathBuf>,
}

impl IntermediateFiles {
    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// 刪除所有追蹤中的檔案，回傳實際刪除的數量
    fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("無法刪除中繼檔 {}: {e}", path.display()),
            }
        }
        removed
    }
}

impl Drop for IntermediateFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}
