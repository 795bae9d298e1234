//! 影片操作元件
//!
//! 每個操作組合 `CommandBuilder` 與 `ProcessRunner`，並處理操作前後的檔案：
//! - 長度探測（ffprobe）
//! - 合併：concat 濾鏡重新編碼 / TS stream copy
//! - 網格預覽圖：由圖片或影片取樣
//! - 擷取畫面
//! - 裁切

mod concat;
mod frames;
mod preview;
mod probe;
mod trim;
mod types;

pub use probe::parse_duration_seconds;
pub use trim::trim_duration;
pub use types::{
    ConcatOutcome, DEFAULT_TILE_COLUMNS, DEFAULT_TILE_ROWS, TileSpec, TimeRange, TrimOutcome,
};

use crate::config::ToolSettings;
use crate::tools::{CommandBuilder, ProcessRunner};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 影片操作入口
///
/// 每次呼叫彼此獨立，沒有共享狀態；同一資料夾的並行呼叫需由呼叫端隔離。
#[derive(Debug, Clone)]
pub struct MediaOps {
    builder: CommandBuilder,
    runner: ProcessRunner,
    session_id: Option<String>,
}

impl Default for MediaOps {
    fn default() -> Self {
        Self::new(&ToolSettings::default())
    }
}

impl MediaOps {
    #[must_use]
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            builder: CommandBuilder::from_settings(settings),
            runner: ProcessRunner::new().with_timeout(settings.timeout()),
            session_id: settings.session_id.clone(),
        }
    }

    /// 中斷訊號設定後，執行中的外部程序會被終止
    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.runner = self.runner.with_shutdown_signal(shutdown_signal);
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    fn session(&self) -> Session<'_> {
        Session(self.session_id.as_deref())
    }
}

/// 日誌前綴，用於對應呼叫端的工作階段
struct Session<'a>(Option<&'a str>);

impl fmt::Display for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "[session {id}] "),
            None => Ok(()),
        }
    }
}
