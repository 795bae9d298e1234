use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 預覽圖網格預設值：4 欄 x 2 列 = 8 格
pub const DEFAULT_TILE_COLUMNS: u32 = 4;
pub const DEFAULT_TILE_ROWS: u32 = 2;

/// 預覽圖網格配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub columns: u32,
    pub rows: u32,
}

impl Default for TileSpec {
    fn default() -> Self {
        Self {
            columns: DEFAULT_TILE_COLUMNS,
            rows: DEFAULT_TILE_ROWS,
        }
    }
}

impl TileSpec {
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// 建立並檢查網格
    pub fn try_new(columns: u32, rows: u32) -> Result<Self> {
        let tile = Self::new(columns, rows);
        tile.validate()?;
        Ok(tile)
    }

    /// 欄列數必須大於 0，且總格數不可超出 `u32`
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(MediaError::InvalidArgument(format!(
                "網格欄列數必須大於 0: {self}"
            )));
        }
        if self.columns.checked_mul(self.rows).is_none() {
            return Err(MediaError::InvalidArgument(format!(
                "網格格數過大: {self}"
            )));
        }
        Ok(())
    }

    /// 網格總格數；未經檢查的網格也不會 panic，且至少為 1
    #[must_use]
    pub const fn cells(&self) -> u32 {
        let cells = self.columns.saturating_mul(self.rows);
        if cells == 0 { 1 } else { cells }
    }
}

/// ffmpeg tile 濾鏡的 `CxR` 格式
impl fmt::Display for TileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

/// 時間區間（秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// 為網格取樣調整區間
    ///
    /// 起點小於 0 時歸零；區間短於格數時從起點往後延長，
    /// 確保每一格都能取到不同的畫面。
    #[must_use]
    pub fn normalized_for_tiles(&self, tile: TileSpec) -> Self {
        let start = self.start.max(0.0);
        let min_span = f64::from(tile.cells());
        let end = if self.end - start < min_span {
            start + min_span
        } else {
            self.end
        };
        Self { start, end }
    }

    /// 讓 `cells` 張畫面平均分佈在區間內的取樣幀率
    #[must_use]
    pub fn sampling_rate(&self, tile: TileSpec) -> f64 {
        f64::from(tile.cells()) / self.span()
    }
}

/// 合併影片的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcatOutcome {
    /// 沒有輸入檔案，未執行任何外部程序
    NoInputs,
    /// 已執行合併；`status` 非零時輸出檔可能無效
    Merged { output: PathBuf, status: i32 },
}

impl ConcatOutcome {
    #[must_use]
    pub fn output(&self) -> Option<&PathBuf> {
        match self {
            Self::NoInputs => None,
            Self::Merged { output, .. } => Some(output),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Merged { status: 0, .. })
    }
}

/// 裁切結果；`status` 為 ffmpeg 結束碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    pub output: PathBuf,
    pub status: i32,
}

impl TrimOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 0
    }
}
