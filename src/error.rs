use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 影片工具操作錯誤
///
/// 工具非零結束碼不屬於錯誤，會以狀態碼回傳給呼叫端；
/// 這裡只列出「無法取得有效結果」的情況。
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("無法啟動 {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("等待 {program} 結束時發生錯誤: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} 執行超過 {timeout:?}，已強制終止")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} 已因中斷訊號取消")]
    Cancelled { program: String },

    #[error("ffprobe 執行失敗 (status {status}): {stderr}")]
    ProbeFailed { status: i32, stderr: String },

    #[error("無法解析 ffprobe 輸出: {0:?}")]
    MalformedOutput(String),

    #[error("參數無效: {0}")]
    InvalidArgument(String),

    #[error("檔案操作失敗 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MediaError>;

impl MediaError {
    /// 是否為無法啟動外部工具（例如找不到執行檔）
    #[must_use]
    pub const fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}
