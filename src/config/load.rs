use crate::config::types::{Config, SETTINGS_FILE, ToolSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

impl Config {
    /// 從目前目錄的 settings.json 載入；檔案不存在或格式錯誤時使用預設值
    pub fn new() -> Result<Self> {
        let settings = Self::load_settings(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("無法載入設定，使用預設值: {e:#}");
            ToolSettings::default()
        });

        Ok(Self { settings })
    }

    /// 從指定路徑載入，錯誤會往上傳遞
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self {
            settings: Self::load_settings(path)?,
        })
    }

    fn load_settings(path: &Path) -> Result<ToolSettings> {
        if !path.exists() {
            return Ok(ToolSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: ToolSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings
            .tile
            .validate()
            .with_context(|| format!("Invalid tile grid in {}", path.display()))?;
        Ok(settings)
    }
}
