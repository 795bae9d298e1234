use super::command_builder::ToolCommand;
use crate::error::{MediaError, Result};
use log::{debug, warn};
use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 子程序輸出處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Capture,
    Discard,
}

/// 外部程序執行結果
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// 結束碼；被訊號終止時為 -1
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandResult {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.status == 0
    }

    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// 不經 shell 直接執行外部工具
///
/// 非零結束碼不視為錯誤；只有無法啟動、逾時或被取消時回傳 `Err`。
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    pub fn run(&self, command: &ToolCommand, mode: OutputMode) -> Result<CommandResult> {
        let program = command.program_name();
        debug!("執行: {} {:?}", program, command.args_lossy());

        if self.is_cancelled() {
            return Err(MediaError::Cancelled { program });
        }

        let (stdout_cfg, stderr_cfg) = match mode {
            OutputMode::Capture => (Stdio::piped(), Stdio::piped()),
            OutputMode::Discard => (Stdio::null(), Stdio::null()),
        };

        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(stdout_cfg)
            .stderr(stderr_cfg)
            .spawn()
            .map_err(|source| MediaError::Launch {
                program: program.clone(),
                source,
            })?;

        // 以獨立執行緒讀取輸出，避免管線塞滿造成子程序卡住
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = self.wait(&mut child, &program);

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        let status = status?;
        Ok(CommandResult {
            status: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|s| s.load(Ordering::SeqCst))
    }

    fn wait(&self, child: &mut Child, program: &str) -> Result<ExitStatus> {
        let started = Instant::now();

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(source) => {
                    kill_and_reap(child, program);
                    return Err(MediaError::Wait {
                        program: program.to_string(),
                        source,
                    });
                }
            }

            if self.is_cancelled() {
                warn!("收到中斷信號，終止 {program}");
                kill_and_reap(child, program);
                return Err(MediaError::Cancelled {
                    program: program.to_string(),
                });
            }

            if let Some(timeout) = self.timeout.filter(|t| started.elapsed() >= *t) {
                warn!("{program} 執行逾時 ({timeout:?})，強制終止");
                kill_and_reap(child, program);
                return Err(MediaError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn kill_and_reap(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        warn!("無法終止 {program}: {e}");
    }
    let _ = child.wait();
}

fn spawn_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
