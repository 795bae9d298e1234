use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 輸入檔所在資料夾；沒有上層目錄時使用目前目錄
#[must_use]
pub fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn file_stem(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .map_or_else(|| fallback.to_string(), |s| s.to_string_lossy().to_string())
}

/// filter 合併的預設輸出：`<第一個輸入的資料夾>/<uuid>.mp4`
#[must_use]
pub fn default_concat_output(first_input: &Path) -> PathBuf {
    parent_directory(first_input).join(format!("{}.mp4", Uuid::new_v4()))
}

/// TS 合併的預設輸出：`<第一個輸入的資料夾>/<uuid>_merged_file.mp4`
#[must_use]
pub fn default_merged_output(first_input: &Path) -> PathBuf {
    parent_directory(first_input).join(format!("{}_merged_file.mp4", Uuid::new_v4()))
}

/// 中繼 `.ts` 檔：與輸入同資料夾，加上短 id 避免覆蓋既有的 `.ts`
#[must_use]
pub fn intermediate_ts_path(input: &Path) -> PathBuf {
    let stem = file_stem(input, "input");
    parent_directory(input).join(format!("{stem}.{}.ts", short_id()))
}

/// 裁切的預設輸出：`<資料夾>/<檔名>_trim_<短 id>.<副檔名>`
#[must_use]
pub fn default_trim_output(input: &Path) -> PathBuf {
    let stem = file_stem(input, "video");
    let extension = input
        .extension()
        .map_or_else(|| "mp4".to_string(), |e| e.to_string_lossy().to_string());
    parent_directory(input).join(format!("{stem}_trim_{}.{extension}", short_id()))
}
