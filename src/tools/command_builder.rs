use crate::config::ToolSettings;
use crate::error::{MediaError, Result};
use crate::media::{TileSpec, TimeRange};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 已拆分好的外部工具命令
///
/// 參數以 `OsString` 逐一保存，不經過 shell，路徑中的空白或引號都不會被重新解析。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// 程式名稱（用於日誌與錯誤訊息）
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    #[must_use]
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// 為每種影片操作建立 ffmpeg / ffprobe 參數
///
/// 所有方法都是純函式，只產生命令，不執行。
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    log_level: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::from_settings(&ToolSettings::default())
    }
}

impl CommandBuilder {
    #[must_use]
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg_path.clone(),
            ffprobe: settings.ffprobe_path.clone(),
            log_level: settings.log_level.clone(),
        }
    }

    fn ffmpeg(&self) -> ToolCommand {
        ToolCommand::new(&self.ffmpeg).args([
            "-hide_banner",
            "-nostdin",
            "-loglevel",
            self.log_level.as_str(),
        ])
    }

    /// 只輸出 container 長度（秒），不含標頭與裝飾
    #[must_use]
    pub fn probe_duration(&self, path: &Path) -> ToolCommand {
        ToolCommand::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path_arg(path))
    }

    /// 以 concat 濾鏡重新編碼合併（可處理不同幀率與解析度）
    pub fn concat_filter(
        &self,
        inputs: &[impl AsRef<Path>],
        has_audio: bool,
        output: &Path,
    ) -> Result<ToolCommand> {
        if inputs.is_empty() {
            return Err(MediaError::InvalidArgument(
                "concat 濾鏡至少需要一個輸入檔".to_string(),
            ));
        }

        let mut cmd = self.ffmpeg();
        for input in inputs {
            cmd = cmd.arg("-i").arg(path_arg(input.as_ref()));
        }

        cmd = cmd
            .arg("-filter_complex")
            .arg(concat_filter_graph(inputs.len(), has_audio))
            .args(["-map", "[outv]"]);
        if has_audio {
            cmd = cmd.args(["-map", "[outa]"]);
        }

        Ok(cmd.args(["-strict", "-2", "-y"]).arg(path_arg(output)))
    }

    /// 以 stream copy 轉成 MPEG-TS，供 concat 協定直接串接
    #[must_use]
    pub fn transcode_to_transport_stream(&self, input: &Path, output: &Path) -> ToolCommand {
        self.ffmpeg()
            .arg("-i")
            .arg(path_arg(input))
            .args([
                "-y",
                "-c",
                "copy",
                "-bsf:v",
                "h264_mp4toannexb",
                "-f",
                "mpegts",
            ])
            .arg(path_arg(output))
    }

    /// 以 concat 協定串接多個 `.ts` 檔
    pub fn concat_transport_streams(
        &self,
        ts_files: &[impl AsRef<Path>],
        output: &Path,
    ) -> Result<ToolCommand> {
        let descriptor = concat_protocol_descriptor(ts_files)?;

        Ok(self
            .ffmpeg()
            .arg("-i")
            .arg(descriptor)
            .args(["-y", "-c", "copy", "-bsf:a", "aac_adtstoasc"])
            .arg(path_arg(output)))
    }

    /// 以資料夾內的 jpg 組成網格預覽圖
    #[must_use]
    pub fn tile_from_images(&self, input_dir: &Path, tile: TileSpec, output: &Path) -> ToolCommand {
        self.ffmpeg()
            .args(["-pattern_type", "glob", "-i"])
            .arg(path_arg(&input_dir.join("*.jpg")))
            .arg("-filter_complex")
            .arg(format!("scale=iw/2:-1,tile={tile}"))
            .args(["-frames:v", "1", "-y"])
            .arg(path_arg(output))
    }

    /// 在區間內平均取樣 `tile.cells()` 張畫面組成網格預覽圖
    #[must_use]
    pub fn tile_from_video(
        &self,
        path: &Path,
        range: TimeRange,
        tile: TileSpec,
        output: &Path,
    ) -> ToolCommand {
        let range = range.normalized_for_tiles(tile);
        let frame_rate = range.sampling_rate(tile);

        // 濾鏡參數內的逗號必須跳脫，否則會被視為濾鏡分隔
        let filter = format!(
            "select='between(t\\,{}\\,{})',fps={frame_rate},scale=iw/2:-1,tile={tile}:margin=2:padding=2",
            range.start, range.end
        );

        self.ffmpeg()
            .arg("-i")
            .arg(path_arg(path))
            .args(["-frames:v", "1", "-q:v", "1", "-vf"])
            .arg(filter)
            .arg("-y")
            .arg(path_arg(output))
    }

    /// 依指定幀率輸出 `out_dir/1.jpg`, `out_dir/2.jpg`, ...
    #[must_use]
    pub fn extract_frames(
        &self,
        path: &Path,
        range: TimeRange,
        fps: f64,
        out_dir: &Path,
    ) -> ToolCommand {
        self.ffmpeg()
            .arg("-i")
            .arg(path_arg(path))
            .arg("-ss")
            .arg(range.start.to_string())
            .arg("-to")
            .arg(range.end.to_string())
            .arg("-r")
            .arg(fps.to_string())
            .arg("-y")
            .arg(path_arg(&out_dir.join("%d.jpg")))
    }

    /// 從 `start` 開始擷取 `duration` 秒
    #[must_use]
    pub fn trim(&self, path: &Path, start: f64, duration: f64, output: &Path) -> ToolCommand {
        self.ffmpeg()
            .arg("-i")
            .arg(path_arg(path))
            .arg("-ss")
            .arg(start.to_string())
            .arg("-t")
            .arg(duration.to_string())
            .arg("-y")
            .arg(path_arg(output))
    }
}

/// 路徑參數
///
/// 以 `-` 開頭的相對路徑會被 ffmpeg / ffprobe 當成選項，前面補上 `./`。
fn path_arg(path: &Path) -> OsString {
    if path.is_relative() && path.as_os_str().as_encoded_bytes().starts_with(b"-") {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// 建立 concat 濾鏡字串
///
/// 例如 2 個含音訊的輸入：`[0:v:0][0:a:0][1:v:0][1:a:0]concat=n=2:v=1:a=1[outv][outa]`
#[must_use]
pub fn concat_filter_graph(input_count: usize, has_audio: bool) -> String {
    let mut graph = String::new();
    for i in 0..input_count {
        graph.push_str(&format!("[{i}:v:0]"));
        if has_audio {
            graph.push_str(&format!("[{i}:a:0]"));
        }
    }

    if has_audio {
        graph.push_str(&format!("concat=n={input_count}:v=1:a=1[outv][outa]"));
    } else {
        graph.push_str(&format!("concat=n={input_count}:v=1[outv]"));
    }
    graph
}

/// 建立 `concat:a.ts|b.ts|...` 描述字串
///
/// concat 協定以 `|` 分隔路徑，路徑本身含 `|` 時無法正確表達，直接拒絕。
fn concat_protocol_descriptor(ts_files: &[impl AsRef<Path>]) -> Result<OsString> {
    if ts_files.is_empty() {
        return Err(MediaError::InvalidArgument(
            "concat 協定至少需要一個 .ts 檔".to_string(),
        ));
    }

    let mut descriptor = OsString::from("concat:");
    for (i, file) in ts_files.iter().enumerate() {
        let file = file.as_ref();
        if file.to_string_lossy().contains('|') {
            return Err(MediaError::InvalidArgument(format!(
                "路徑含有 concat 分隔字元 '|': {}",
                file.display()
            )));
        }
        if i > 0 {
            descriptor.push("|");
        }
        descriptor.push(file.as_os_str());
    }
    Ok(descriptor)
}
