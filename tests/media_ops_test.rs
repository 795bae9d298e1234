//! 以假的 ffmpeg / ffprobe 腳本驗證各操作傳給外部工具的參數與檔案處理
//!
//! 腳本會把收到的參數逐行寫入 `<最後一個參數>.args`，並建立空的輸出檔。

#![cfg(unix)]

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;
use video_toolkit::config::ToolSettings;
use video_toolkit::{ConcatOutcome, MediaError, MediaOps, TileSpec, TimeRange};

const RECORDING_FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$@" > "$last.args"
: > "$last"
exit 0
"#;

// 產生輸出檔但回傳非零狀態
const PARTIAL_FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$@" > "$last.args"
: > "$last"
exit 1
"#;

// 不產生輸出檔
const FAILING_FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$@" > "$last.args"
echo "Invalid data found when processing input" >&2
exit 1
"#;

const SLOW_FFMPEG: &str = "#!/bin/sh\nexec sleep 5\n";

const FFPROBE: &str = "#!/bin/sh\necho 20.480000\n";
const MALFORMED_FFPROBE: &str = "#!/bin/sh\necho N/A\n";
const MISSING_FILE_FFPROBE: &str =
    "#!/bin/sh\necho \"$1: No such file or directory\" >&2\nexit 1\n";

struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    fn bin(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// 所有腳本只寫入一次，之後才會有任何測試啟動子程序
fn tools() -> &'static FakeTools {
    static TOOLS: OnceLock<FakeTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        for (name, script) in [
            ("ffmpeg", RECORDING_FFMPEG),
            ("ffmpeg-partial", PARTIAL_FFMPEG),
            ("ffmpeg-failing", FAILING_FFMPEG),
            ("ffmpeg-slow", SLOW_FFMPEG),
            ("ffprobe", FFPROBE),
            ("ffprobe-malformed", MALFORMED_FFPROBE),
            ("ffprobe-missing", MISSING_FILE_FFPROBE),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        FakeTools { dir }
    })
}

fn ops_with(ffmpeg: &str, ffprobe: &str) -> MediaOps {
    let tools = tools();
    let settings = ToolSettings {
        ffmpeg_path: tools.bin(ffmpeg),
        ffprobe_path: tools.bin(ffprobe),
        ..ToolSettings::default()
    };
    MediaOps::new(&settings).with_session_id("test")
}

fn ops() -> MediaOps {
    ops_with("ffmpeg", "ffprobe")
}

fn recorded_args(last_arg: &Path) -> Vec<String> {
    let mut path = OsString::from(last_arg.as_os_str());
    path.push(".args");
    fs::read_to_string(PathBuf::from(path))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn value_after(args: &[String], flag: &str) -> String {
    let index = args.iter().position(|a| a == flag).unwrap();
    args[index + 1].clone()
}

fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with(suffix))
        .collect();
    files.sort();
    files
}

#[test]
fn test_probe_duration_truncates_to_seconds() {
    let seconds = ops().probe_duration(Path::new("/videos/clip.mp4")).unwrap();
    assert_eq!(seconds, 20);
}

#[test]
fn test_probe_duration_malformed_output() {
    let err = ops_with("ffmpeg", "ffprobe-malformed")
        .probe_duration(Path::new("/videos/clip.mp4"))
        .unwrap_err();
    assert!(matches!(err, MediaError::MalformedOutput(ref s) if s == "N/A"));
}

#[test]
fn test_probe_duration_missing_file() {
    let err = ops_with("ffmpeg", "ffprobe-missing")
        .probe_duration(Path::new("/videos/missing.mp4"))
        .unwrap_err();
    match err {
        MediaError::ProbeFailed { status, stderr } => {
            assert_eq!(status, 1);
            assert!(stderr.contains("No such file"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_tool_is_launch_failure() {
    let err = ops_with("does-not-exist", "ffprobe")
        .trim(Path::new("in.mp4"), 0.0, Some(4.0), Some(Path::new("out.mp4")))
        .unwrap_err();
    assert!(err.is_launch_failure());
}

#[test]
fn test_concat_filter_references_every_input() {
    let temp_dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = ["a.mp4", "b b.mp4", "c.mp4"]
        .iter()
        .map(|n| temp_dir.path().join(n))
        .collect();
    let output = temp_dir.path().join("merged.mp4");

    let outcome = ops().concat_filter(&inputs, true, Some(output.as_path())).unwrap();
    assert_eq!(
        outcome,
        ConcatOutcome::Merged {
            output: output.clone(),
            status: 0
        }
    );

    let args = recorded_args(&output);
    let input_args: Vec<_> = args
        .windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| PathBuf::from(&w[1]))
        .collect();
    assert_eq!(input_args, inputs);

    let graph = value_after(&args, "-filter_complex");
    assert_eq!(graph.matches(":v:0]").count() + graph.matches(":a:0]").count(), 6);
    assert!(graph.ends_with("concat=n=3:v=1:a=1[outv][outa]"));
}

#[test]
fn test_concat_filter_without_audio_and_default_output() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![temp_dir.path().join("a.mp4"), temp_dir.path().join("b.mp4")];

    let outcome = ops().concat_filter(&inputs, false, None).unwrap();
    let output = outcome.output().unwrap().clone();
    assert!(outcome.is_success());
    assert_eq!(output.parent(), Some(temp_dir.path()));
    assert_eq!(output.extension().unwrap(), "mp4");

    let graph = value_after(&recorded_args(&output), "-filter_complex");
    assert_eq!(graph, "[0:v:0][1:v:0]concat=n=2:v=1[outv]");
}

#[test]
fn test_concat_filter_failure_still_returns_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("merged.mp4");

    let outcome = ops_with("ffmpeg-failing", "ffprobe")
        .concat_filter(&[temp_dir.path().join("a.mp4")], true, Some(output.as_path()))
        .unwrap();
    assert_eq!(
        outcome,
        ConcatOutcome::Merged { output, status: 1 }
    );
}

#[test]
fn test_transport_stream_concat_cleans_only_its_own_files() {
    let temp_dir = TempDir::new().unwrap();
    let unrelated = temp_dir.path().join("recording.ts");
    fs::write(&unrelated, b"keep me").unwrap();

    let inputs: Vec<PathBuf> = ["part1.mp4", "part2.mp4", "part3.mp4"]
        .iter()
        .map(|n| temp_dir.path().join(n))
        .collect();

    let outcome = ops().concat_transport_stream(&inputs, None).unwrap();
    assert!(outcome.is_success());
    let output = outcome.output().unwrap().clone();
    assert!(output.exists());
    assert!(output.to_string_lossy().ends_with("_merged_file.mp4"));

    // 每個輸入各建立一個中繼檔
    assert_eq!(files_with_suffix(temp_dir.path(), ".ts.args").len(), 3);

    let descriptor = value_after(&recorded_args(&output), "-i");
    let intermediates: Vec<PathBuf> = descriptor
        .strip_prefix("concat:")
        .unwrap()
        .split('|')
        .map(PathBuf::from)
        .collect();
    assert_eq!(intermediates.len(), 3);
    for (ts, input) in intermediates.iter().zip(&inputs) {
        assert_eq!(ts.extension().unwrap(), "ts");
        assert_eq!(ts.parent(), input.parent());
        assert!(!ts.exists(), "中繼檔應已刪除: {}", ts.display());
    }

    assert!(unrelated.exists());
    assert_eq!(files_with_suffix(temp_dir.path(), ".ts"), vec![unrelated]);
}

#[test]
fn test_transport_stream_concat_cleans_up_after_failed_merge() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![temp_dir.path().join("a.mp4"), temp_dir.path().join("b.mp4")];
    let output = temp_dir.path().join("merged.mp4");

    let outcome = ops_with("ffmpeg-partial", "ffprobe")
        .concat_transport_stream(&inputs, Some(output.as_path()))
        .unwrap();

    assert_eq!(outcome, ConcatOutcome::Merged { output, status: 1 });
    assert!(files_with_suffix(temp_dir.path(), ".ts").is_empty());
}

#[test]
fn test_tile_from_video_extends_zero_width_window() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");

    let result = ops()
        .tile_from_video(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(2.0, 2.0),
            &output,
            TileSpec::default(),
        )
        .unwrap();
    assert_eq!(result, Some(output.clone()));

    let filter = value_after(&recorded_args(&output), "-vf");
    assert_eq!(
        filter,
        "select='between(t\\,2\\,10)',fps=1,scale=iw/2:-1,tile=4x2:margin=2:padding=2"
    );
}

#[test]
fn test_tile_from_video_clamps_negative_start() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");

    ops()
        .tile_from_video(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(-5.0, 10.0),
            &output,
            TileSpec::default(),
        )
        .unwrap();

    let filter = value_after(&recorded_args(&output), "-vf");
    assert!(filter.starts_with("select='between(t\\,0\\,10)',fps=0.8,"));
}

#[test]
fn test_tile_from_video_custom_grid() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");

    ops()
        .tile_from_video(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(0.0, 36.0),
            &output,
            TileSpec::new(3, 3),
        )
        .unwrap();

    let filter = value_after(&recorded_args(&output), "-vf");
    assert!(filter.contains(",fps=0.25,"));
    assert!(filter.contains("tile=3x3:"));
}

#[test]
fn test_tile_from_video_missing_output_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");
    fs::write(&output, b"stale").unwrap();

    let result = ops_with("ffmpeg-failing", "ffprobe")
        .tile_from_video(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(0.0, 20.0),
            &output,
            TileSpec::default(),
        )
        .unwrap();

    assert_eq!(result, None);
    assert!(!output.exists());
}

#[test]
fn test_tile_from_images() {
    let temp_dir = TempDir::new().unwrap();
    let frames = temp_dir.path().join("frames");
    fs::create_dir(&frames).unwrap();
    for i in 1..=8 {
        fs::write(frames.join(format!("{i}.jpg")), b"jpg").unwrap();
    }
    let output = temp_dir.path().join("collage.jpg");

    let result = ops()
        .tile_from_images(&frames, &output, TileSpec::default())
        .unwrap();
    assert_eq!(result, Some(output.clone()));

    let args = recorded_args(&output);
    assert_eq!(value_after(&args, "-pattern_type"), "glob");
    assert_eq!(
        PathBuf::from(value_after(&args, "-i")),
        frames.join("*.jpg")
    );
    assert_eq!(value_after(&args, "-filter_complex"), "scale=iw/2:-1,tile=4x2");
}

#[test]
fn test_tile_from_images_failure_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");

    let result = ops_with("ffmpeg-failing", "ffprobe")
        .tile_from_images(temp_dir.path(), &output, TileSpec::default())
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_extract_frames_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("sample/frames");

    let status = ops()
        .extract_frames(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(2.0, 10.0),
            2.0,
            &out_dir,
        )
        .unwrap();
    assert_eq!(status, 0);
    assert!(out_dir.is_dir());

    let args = recorded_args(&out_dir.join("%d.jpg"));
    assert_eq!(value_after(&args, "-ss"), "2");
    assert_eq!(value_after(&args, "-to"), "10");
    assert_eq!(value_after(&args, "-r"), "2");

    // 資料夾已存在時再次執行不應出錯
    let status = ops()
        .extract_frames(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(2.0, 10.0),
            2.0,
            &out_dir,
        )
        .unwrap();
    assert_eq!(status, 0);
}

#[test]
fn test_extract_frames_returns_tool_status() {
    let temp_dir = TempDir::new().unwrap();
    let status = ops_with("ffmpeg-failing", "ffprobe")
        .extract_frames(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(0.0, 1.0),
            1.0,
            temp_dir.path(),
        )
        .unwrap();
    assert_eq!(status, 1);
}

#[test]
fn test_trim_defaults_end_to_probed_duration() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("yoga-part-2.mp4");

    let outcome = ops()
        .trim(Path::new("/videos/yoga.mp4"), 8.0, None, Some(output.as_path()))
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.output, output);

    // ffprobe 回報 20.48 秒 -> 20 - 8 = 12
    let args = recorded_args(&output);
    assert_eq!(value_after(&args, "-ss"), "8");
    assert_eq!(value_after(&args, "-t"), "12");
}

#[test]
fn test_trim_with_explicit_end() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cut.mp4");

    ops_with("ffmpeg", "ffprobe-missing")
        .trim(Path::new("/videos/yoga.mp4"), 1.5, Some(4.0), Some(output.as_path()))
        .unwrap();

    assert_eq!(value_after(&recorded_args(&output), "-t"), "2.5");
}

#[test]
fn test_trim_failure_status() {
    let temp_dir = TempDir::new().unwrap();
    let outcome = ops_with("ffmpeg-failing", "ffprobe")
        .trim(
            Path::new("/videos/yoga.mp4"),
            0.0,
            Some(3.0),
            Some(temp_dir.path().join("cut.mp4").as_path()),
        )
        .unwrap();
    assert_eq!(outcome.status, 1);
}

#[test]
fn test_trim_default_output_next_to_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("yoga.mkv");

    let outcome = ops().trim(&input, 2.0, Some(6.0), None).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.output.parent(), Some(temp_dir.path()));

    let name = outcome.output.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("yoga_trim_"));
    assert!(name.ends_with(".mkv"));
    assert!(outcome.output.exists());
    assert_eq!(value_after(&recorded_args(&outcome.output), "-t"), "4");
}

#[test]
fn test_invalid_tile_grid_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("collage.jpg");

    let err = ops()
        .tile_from_video(
            Path::new("/videos/yoga.mp4"),
            TimeRange::new(0.0, 1.0),
            &output,
            TileSpec::new(70_000, 70_000),
        )
        .unwrap_err();
    assert!(matches!(err, MediaError::InvalidArgument(_)));
    assert!(!output.exists());
}

#[test]
fn test_hung_tool_times_out() {
    let tools = tools();
    let settings = ToolSettings {
        ffmpeg_path: tools.bin("ffmpeg-slow"),
        ffprobe_path: tools.bin("ffprobe"),
        timeout_secs: Some(1),
        ..ToolSettings::default()
    };

    let temp_dir = TempDir::new().unwrap();
    let err = MediaOps::new(&settings)
        .trim(
            Path::new("/videos/yoga.mp4"),
            0.0,
            Some(3.0),
            Some(temp_dir.path().join("cut.mp4").as_path()),
        )
        .unwrap_err();
    assert!(matches!(err, MediaError::TimedOut { .. }));
}
