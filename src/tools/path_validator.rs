use crate::error::{MediaError, Result};
use anyhow::bail;
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn validate_file_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("檔案不存在: {}", path.display());
    }
    Ok(())
}

/// 建立資料夾；已存在時不做任何事
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
