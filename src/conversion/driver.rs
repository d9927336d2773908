/*
 * @Date         : 2026-10-17
 * @Description  : 转换驱动：以独立进程调用外部转换工具并收集转换产物
 *
 * 调用约定：`<converter> <graph.json> inputshape=[d0,...,dn]`，工作目录为图文件所在目录；
 * 退出码 0 表示成功。工具的 stdout/stderr 重定向到`<name>.convert.log`。
 * 转换被视为确定且幂等，任何失败都是致命错误，不重试。
 */

use log::{debug, info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use super::artifact::ConversionArtifact;
use super::descriptor::converted_paths;
use super::exporter::ExportedFiles;
use super::lowering::format_input_shape;
use crate::errors::ParityError;

/// 超时等待时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// 报错时附带的日志尾部行数
const LOG_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct ConversionDriver {
    converter: PathBuf,
    timeout: Option<Duration>,
}

impl ConversionDriver {
    pub fn new<P: Into<PathBuf>>(converter: P) -> Self {
        Self {
            converter: converter.into(),
            timeout: None,
        }
    }

    /// 超时后杀掉转换进程并报转换错误；默认无限等待
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn converter(&self) -> &Path {
        &self.converter
    }

    pub fn convert(&self, exported: &ExportedFiles) -> Result<ConversionArtifact, ParityError> {
        let graph_path = absolute(&exported.graph_path);
        let work_dir = graph_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_path = graph_path.with_extension("convert.log");
        let shape_arg = format_input_shape(&exported.input_shape);
        let converter = self.resolve_converter();
        let (module_path, param_path) = converted_paths(&graph_path)?;
        for stale in [&module_path, &param_path] {
            remove_stale(stale)?;
        }

        info!(
            "调用转换工具：{} {} {}",
            converter.display(),
            graph_path.display(),
            shape_arg
        );

        let log_file = File::create(&log_path)
            .map_err(|e| ParityError::Conversion(format!("无法创建转换日志文件: {e}")))?;
        let log_file_err = log_file
            .try_clone()
            .map_err(|e| ParityError::Conversion(format!("无法复制转换日志句柄: {e}")))?;

        let mut child = Command::new(&converter)
            .arg(&graph_path)
            .arg(&shape_arg)
            .current_dir(&work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_err))
            .spawn()
            .map_err(|e| {
                ParityError::Conversion(format!(
                    "无法启动转换工具{}: {e}",
                    converter.display()
                ))
            })?;

        let started = Instant::now();
        let status = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout),
            None => child
                .wait()
                .map_err(|e| ParityError::Conversion(format!("等待转换工具失败: {e}"))),
        }
        .map_err(|e| attach_log_tail(e, &log_path))?;
        debug!("转换工具耗时 {:?}，状态 {status}", started.elapsed());

        if !status.success() {
            return Err(attach_log_tail(
                ParityError::Conversion(format!("转换工具以非零状态退出（{status}）")),
                &log_path,
            ));
        }

        for expected in [&module_path, &param_path] {
            if !expected.is_file() {
                return Err(attach_log_tail(
                    ParityError::Conversion(format!(
                        "转换工具成功退出，但未产出{}",
                        expected.display()
                    )),
                    &log_path,
                ));
            }
        }

        Ok(ConversionArtifact::new(module_path, param_path))
    }

    /// 含路径分隔符的相对路径相对当前目录解析（子进程的工作目录会被切换）；
    /// 纯文件名交给系统在 PATH 中查找
    fn resolve_converter(&self) -> PathBuf {
        if self.converter.components().count() > 1 {
            absolute(&self.converter)
        } else {
            self.converter.clone()
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 删除上次运行遗留的产物，只有本次转换写出的文件才会被收集
fn remove_stale(path: &Path) -> Result<(), ParityError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("删除遗留产物 {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ParityError::Conversion(format!(
            "无法删除遗留产物{}: {e}",
            path.display()
        ))),
    }
}

/// 轮询等待子进程；超时则杀掉并回收
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, ParityError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    warn!("转换工具超过{timeout:?}未结束，强制终止");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ParityError::Conversion(format!(
                        "转换工具超时（{timeout:?}）"
                    )));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(ParityError::Conversion(format!("等待转换工具失败: {e}")));
            }
        }
    }
}

fn attach_log_tail(e: ParityError, log_path: &Path) -> ParityError {
    let ParityError::Conversion(msg) = e else {
        return e;
    };
    let tail = std::fs::read_to_string(log_path)
        .map(|log| {
            let lines: Vec<&str> = log.lines().collect();
            lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n")
        })
        .unwrap_or_default();
    if tail.trim().is_empty() {
        ParityError::Conversion(msg)
    } else {
        ParityError::Conversion(format!("{msg}\n转换日志：\n{tail}"))
    }
}
