use crate::config::Config;
use crate::config::save::save_settings;
use crate::media::TileSpec;
use crate::menu::handlers::{
    run_concat_filter, run_concat_transport_stream, run_extract_frames, run_probe_duration,
    run_tile_from_images, run_tile_from_video, run_trim,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 影片處理工具 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());

    let options = vec![
        "取得影片長度",
        "合併影片（concat 濾鏡，重新編碼）",
        "合併影片（TS stream copy）",
        "圖片網格預覽圖",
        "影片網格預覽圖",
        "擷取畫面",
        "裁切影片",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_probe_duration(term, shutdown_signal, config)?,
        Some(1) => run_concat_filter(term, shutdown_signal, config)?,
        Some(2) => run_concat_transport_stream(term, shutdown_signal, config)?,
        Some(3) => run_tile_from_images(term, shutdown_signal, config)?,
        Some(4) => run_tile_from_video(term, shutdown_signal, config)?,
        Some(5) => run_extract_frames(term, shutdown_signal, config)?,
        Some(6) => run_trim(term, shutdown_signal, config)?,
        Some(7) => show_settings_menu(term, config)?,
        Some(8) | None => return Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }

    Ok(true)
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("按 ESC 返回").dim());

        let settings = &config.settings;
        let timeout = settings
            .timeout_secs
            .map_or_else(|| "不限時".to_string(), |s| format!("{s} 秒"));
        let options = vec![
            format!("執行逾時: {timeout}"),
            format!("預覽圖網格: {}", settings.tile),
            format!(
                "工作階段識別碼: {}",
                settings.session_id.as_deref().unwrap_or("（無）")
            ),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的設定")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let changed = match selection {
            Some(0) => edit_timeout(config)?,
            Some(1) => edit_tile(config)?,
            Some(2) => edit_session_id(config)?,
            Some(3) | None => break, // ESC or back
            _ => unreachable!(),
        };

        if changed {
            save_settings(&config.settings)?;
            println!("\n{}", style("設定已儲存").green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }

    Ok(())
}

/// 0 表示不限時
fn edit_timeout(config: &mut Config) -> Result<bool> {
    let seconds: u64 = Input::new()
        .with_prompt("單一程序逾時秒數（0 表示不限時）")
        .default(config.settings.timeout_secs.unwrap_or(0))
        .interact_text()?;

    let timeout_secs = (seconds > 0).then_some(seconds);
    let changed = timeout_secs != config.settings.timeout_secs;
    config.settings.timeout_secs = timeout_secs;
    Ok(changed)
}

fn edit_tile(config: &mut Config) -> Result<bool> {
    let current = config.settings.tile;
    let columns: u32 = Input::new()
        .with_prompt("欄數")
        .default(current.columns)
        .validate_with(|v: &u32| if *v > 0 { Ok(()) } else { Err("必須大於 0") })
        .interact_text()?;
    let rows: u32 = Input::new()
        .with_prompt("列數")
        .default(current.rows)
        .validate_with(|v: &u32| if *v > 0 { Ok(()) } else { Err("必須大於 0") })
        .interact_text()?;

    let tile = match TileSpec::try_new(columns, rows) {
        Ok(tile) => tile,
        Err(e) => {
            println!("{}", style(e).red());
            std::thread::sleep(std::time::Duration::from_secs(1));
            return Ok(false);
        }
    };
    config.settings.tile = tile;
    Ok(tile != current)
}

fn edit_session_id(config: &mut Config) -> Result<bool> {
    let raw: String = Input::new()
        .with_prompt("工作階段識別碼（空白表示不使用）")
        .allow_empty(true)
        .interact_text()?;

    let session_id = Some(raw.trim().to_string()).filter(|s| !s.is_empty());
    let changed = session_id != config.settings.session_id;
    config.settings.session_id = session_id;
    Ok(changed)
}
