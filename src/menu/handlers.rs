use crate::config::Config;
use crate::media::{ConcatOutcome, MediaOps, TimeRange};
use crate::pause;
use crate::signal::reset_shutdown_signal;
use crate::tools::{validate_directory_exists, validate_file_exists};
use anyhow::{Context, Result};
use console::{Term, style};
use dialoguer::{Confirm, Input};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn media_ops(config: &Config, shutdown_signal: &Arc<AtomicBool>) -> MediaOps {
    reset_shutdown_signal(shutdown_signal);
    MediaOps::new(&config.settings).with_shutdown_signal(Arc::clone(shutdown_signal))
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(PathBuf::from(path.trim()))
}

fn prompt_seconds(prompt: &str, default: f64) -> Result<f64> {
    Ok(Input::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()?)
}

/// 空白輸入代表未指定
fn prompt_optional_seconds(prompt: &str) -> Result<Option<f64>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let seconds = raw
        .parse::<f64>()
        .with_context(|| format!("無效的秒數: {raw}"))?;
    Ok(Some(seconds))
}

/// 逐一輸入影片路徑，空白行結束
fn prompt_input_list() -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    loop {
        let raw: String = Input::new()
            .with_prompt(format!("第 {} 個影片路徑（空白結束）", inputs.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        let raw = raw.trim();
        if raw.is_empty() {
            break;
        }
        let path = PathBuf::from(raw);
        validate_file_exists(&path)?;
        inputs.push(path);
    }
    Ok(inputs)
}

fn print_failure(message: &str) {
    println!("{} {}", style("✗").red(), message);
}

fn print_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

fn print_status(status: i32, action: &str) {
    if status == 0 {
        print_success(&format!("{action}完成"));
    } else {
        print_failure(&format!("{action}失敗 (status {status})"));
    }
}

fn print_concat_outcome(outcome: &ConcatOutcome) {
    match outcome {
        ConcatOutcome::NoInputs => println!("{}", style("沒有輸入檔，未執行合併").yellow()),
        ConcatOutcome::Merged { output, status: 0 } => {
            print_success(&format!("合併完成: {}", output.display()));
        }
        ConcatOutcome::Merged { output, status } => print_failure(&format!(
            "合併失敗 (status {status})，輸出可能無效: {}",
            output.display()
        )),
    }
}

fn report_error(term: &Term, result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }
    pause(term)
}

pub fn run_probe_duration(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        let path = prompt_path("請輸入影片路徑")?;
        let seconds = media_ops(config, shutdown_signal).probe_duration(&path)?;
        print_success(&format!("{} 長度: {seconds} 秒", path.display()));
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_concat_filter(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        let inputs = prompt_input_list()?;
        let has_audio = Confirm::new()
            .with_prompt("輸入影片是否含音訊？")
            .default(true)
            .interact()?;

        let outcome =
            media_ops(config, shutdown_signal).concat_filter(&inputs, has_audio, None)?;
        print_concat_outcome(&outcome);
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_concat_transport_stream(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        println!("{}", style("TS 合併僅適用於編碼參數相同的影片").dim());
        let inputs = prompt_input_list()?;

        let outcome = media_ops(config, shutdown_signal).concat_transport_stream(&inputs, None)?;
        print_concat_outcome(&outcome);
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_tile_from_images(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        let input_dir = prompt_path("請輸入圖片資料夾路徑")?;
        validate_directory_exists(&input_dir)?;
        let output = prompt_path("請輸入預覽圖輸出路徑")?;

        match media_ops(config, shutdown_signal).tile_from_images(
            &input_dir,
            &output,
            config.settings.tile,
        )? {
            Some(path) => print_success(&format!("預覽圖已建立: {}", path.display())),
            None => print_failure("預覽圖未建立"),
        }
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_tile_from_video(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        let path = prompt_path("請輸入影片路徑")?;
        validate_file_exists(&path)?;
        let start = prompt_seconds("起始秒數", 0.0)?;
        let end = prompt_seconds("結束秒數", start + f64::from(config.settings.tile.cells()))?;
        let output = prompt_path("請輸入預覽圖輸出路徑")?;

        match media_ops(config, shutdown_signal).tile_from_video(
            &path,
            TimeRange::new(start, end),
            &output,
            config.settings.tile,
        )? {
            Some(path) => print_success(&format!("預覽圖已建立: {}", path.display())),
            None => print_failure("預覽圖未建立"),
        }
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_extract_frames(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| -> Result<()> {
        let path = prompt_path("請輸入影片路徑")?;
        validate_file_exists(&path)?;
        let start = prompt_seconds("起始秒數", 0.0)?;
        let end = prompt_seconds("結束秒數", start + 10.0)?;
        let fps = prompt_seconds("每秒擷取張數", 1.0)?;
        let out_dir = prompt_path("請輸入畫面輸出資料夾")?;

        let status = media_ops(config, shutdown_signal).extract_frames(
            &path,
            TimeRange::new(start, end),
            fps,
            &out_dir,
        )?;
        print_status(status, "擷取畫面");
        Ok(())
    })();
    report_error(term, result)
}

pub fn run_trim(term: &Term, shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    let result = (|| -> Result<()> {
        let path = prompt_path("請輸入影片路徑")?;
        validate_file_exists(&path)?;
        let start = prompt_seconds("起始秒數", 0.0)?;
        let end = prompt_optional_seconds("結束秒數（空白表示到影片結尾）")?;

        let output: String = Input::new()
            .with_prompt("請輸入輸出路徑（空白表示 <檔名>_trim_<id>）")
            .allow_empty(true)
            .interact_text()?;
        let output = Some(PathBuf::from(output.trim())).filter(|p| !p.as_os_str().is_empty());

        let outcome =
            media_ops(config, shutdown_signal).trim(&path, start, end, output.as_deref())?;
        print_status(outcome.status, &format!("裁切 {}", outcome.output.display()));
        Ok(())
    })();
    report_error(term, result)
}
