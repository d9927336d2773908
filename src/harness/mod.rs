/*
 * @Date         : 2026-10-17
 * @Description  : 校验编排：固定种子生成输入 → 参考执行 → 导出+转换 → 转换后执行 → 判定
 *
 * 各阶段严格顺序执行，前一阶段的输出是后一阶段的前提。任何阶段的错误都原样返回，
 * 由调用方（二进制入口）转换为退出码；本模块自身不终止进程
 */

use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

use crate::conversion::{ConversionDriver, GraphExporter, WorkDir};
use crate::converted::ConvertedExecutor;
use crate::errors::ParityError;
use crate::oracle::{EquivalenceOracle, Verdict};
use crate::reference::ReferenceExecutor;
use crate::tensor::Tensor;

mod config;
pub mod logger;

pub use self::config::{DEFAULT_CONVERTER, HarnessConfig};

#[cfg(test)]
mod tests;

/// 退出码：一致
pub const EXIT_PASS: i32 = 0;
/// 退出码：不一致或任一阶段出错
pub const EXIT_FAIL: i32 = 1;

/// 一次通过的校验的结果
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessReport {
    pub name: String,
    pub operator_count: usize,
    pub output_shape: Vec<usize>,
    pub verdict: Verdict,
    /// 保留下来的工作目录
    pub artifacts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// 固定种子生成[0, 1)均匀分布的输入
    pub fn make_input(&self) -> Tensor {
        Tensor::new_random_seeded(0.0, 1.0, &self.config.input_shape, self.config.seed)
    }

    /// 完整运行一次。返回`Ok`即表示一致；数值不一致以`ParityError::ValueMismatch`返回
    pub fn run(&self) -> Result<HarnessReport, ParityError> {
        let config = &self.config;
        config.validate()?;
        let sequence = config.sequence();
        info!(
            "校验 {}：{} 个 {} 类算子，输入形状 {:?}，种子 {}，策略 {}",
            config.name,
            sequence.len(),
            config.family,
            config.input_shape,
            config.seed,
            config.policy
        );

        // 1. 输入
        let input = self.make_input();
        debug!("输入 {input}");

        // 2. 参考执行
        let reference = ReferenceExecutor::new().run(&input, &sequence)?;
        info!("参考输出形状 {:?}", reference.shape());

        // 3. 导出 + 转换（工作目录在离开作用域时清理）
        let work_dir = match (&config.work_dir, config.keep_artifacts) {
            (Some(dir), _) => WorkDir::kept(dir)?,
            (None, true) => WorkDir::Kept(WorkDir::temporary()?.keep()),
            (None, false) => WorkDir::temporary()?,
        };
        let exported =
            GraphExporter::new().export(&sequence, &input, work_dir.path(), &config.name)?;
        let mut driver = ConversionDriver::new(&config.converter);
        if let Some(secs) = config.timeout_secs {
            driver = driver.with_timeout(Duration::from_secs(secs));
        }
        let artifact = driver.convert(&exported)?;

        // 4. 转换后执行
        let candidate = ConvertedExecutor::new().run(artifact, &input, reference.shape())?;
        debug!("候选输出 {candidate}");

        // 5. 判定
        let verdict = EquivalenceOracle::new(config.policy)
            .compare(&reference, &candidate)?
            .into_result()?;
        if let Some(diagnostic) = &verdict.diagnostic {
            info!("在容差内通过：{diagnostic}");
        }

        let artifacts_dir = match work_dir {
            WorkDir::Kept(path) => {
                info!("产物保留在 {}", path.display());
                Some(path)
            }
            WorkDir::Temp(_) => None,
        };
        Ok(HarnessReport {
            name: config.name.clone(),
            operator_count: sequence.len(),
            output_shape: reference.shape().to_vec(),
            verdict,
            artifacts_dir,
        })
    }
}

/// 0 = 一致；1 = 不一致或任一阶段出错
pub fn exit_code(result: &Result<HarnessReport, ParityError>) -> i32 {
    match result {
        Ok(report) if report.verdict.passed => EXIT_PASS,
        _ => EXIT_FAIL,
    }
}
