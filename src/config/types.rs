use crate::media::TileSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

/// 外部工具設定（儲存在 settings.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// 傳給 ffmpeg `-loglevel` 的值
    pub log_level: String,
    /// 單一外部程序的執行上限；`None` 表示不限時
    pub timeout_secs: Option<u64>,
    pub tile: TileSpec,
    /// 附加在日誌前綴的工作階段識別碼
    pub session_id: Option<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            log_level: "error".to_string(),
            timeout_secs: None,
            tile: TileSpec::default(),
            session_id: None,
        }
    }
}

impl ToolSettings {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: ToolSettings,
}
