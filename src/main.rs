/*
 * @Date         : 2026-10-17
 * @Description  : op_parity 命令行入口：运行一次一致性校验，以退出码报告结果（0 一致，1 失败）
 */

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use op_parity::errors::ParityError;
use op_parity::harness::{DEFAULT_CONVERTER, Harness, HarnessConfig, exit_code, logger};
use op_parity::operator::OperatorFamily;
use op_parity::oracle::ComparisonPolicy;

#[derive(Parser, Debug)]
#[command(name = "op_parity", version, about = "校验转换后模型与参考实现的池化算子输出是否一致")]
struct Cli {
    /// JSON 配置文件；命令行参数覆盖其中的同名字段
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 受校验的算子族
    #[arg(short, long, value_enum)]
    family: Option<OperatorFamily>,

    /// 导出图名称
    #[arg(short, long)]
    name: Option<String>,

    /// 外部转换工具（缺省为与本程序同目录的 op_convert，其次在 PATH 中查找）
    #[arg(long)]
    converter: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// 输入形状，如 1,12,128,127
    #[arg(long, value_delimiter = ',')]
    input_shape: Option<Vec<usize>>,

    /// 转换工具超时（秒）
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// 绝对容差；与 --rel-tol 任一给出即改用容差比较
    #[arg(long)]
    abs_tol: Option<f32>,

    /// 相对容差
    #[arg(long)]
    rel_tol: Option<f32>,

    /// 工作目录（保留产物）
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// 保留临时工作目录
    #[arg(long)]
    keep_artifacts: bool,

    /// 日志级别：error / warn / info / debug / trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<HarnessConfig, ParityError> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_json_file(path)?,
            None => HarnessConfig {
                converter: default_converter(),
                ..HarnessConfig::default()
            },
        };

        if let Some(family) = self.family {
            config.family = family;
            if self.name.is_none() && self.config.is_none() {
                config.name = format!("test_{family}");
            }
        }
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(converter) = self.converter {
            config.converter = converter;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(shape) = self.input_shape {
            config.input_shape = shape;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        if self.abs_tol.is_some() || self.rel_tol.is_some() {
            config.policy = ComparisonPolicy::Tolerance {
                abs: self.abs_tol.unwrap_or(0.0),
                rel: self.rel_tol.unwrap_or(0.0),
            };
        }
        if let Some(dir) = self.work_dir {
            config.work_dir = Some(dir);
        }
        config.keep_artifacts |= self.keep_artifacts;
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

/// 优先使用与本程序同目录的 op_convert
fn default_converter() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| {
            let file_name = format!("{DEFAULT_CONVERTER}{}", std::env::consts::EXE_SUFFIX);
            let sibling = exe.with_file_name(file_name);
            sibling.is_file().then_some(sibling)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONVERTER))
}

fn main() {
    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = logger::init_log(&config.log_level) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let result = Harness::new(config).run();
    match &result {
        Ok(report) => {
            info!(
                "{}：{} 个算子，输出形状 {:?}，结果一致",
                report.name, report.operator_count, report.output_shape
            );
            println!("PASS {}", report.name);
        }
        Err(e) => {
            error!("[{}] {e}", e.stage());
            println!("FAIL {}", e.stage());
        }
    }
    std::process::exit(exit_code(&result));
}
