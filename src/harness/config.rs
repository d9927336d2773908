/*
 * @Date         : 2026-10-17
 * @Description  : 校验运行配置（JSON 文件 / 命令行覆盖）
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ParityError;
use crate::operator::{OperatorFamily, OperatorSequence, parameter_space};
use crate::oracle::ComparisonPolicy;

/// 默认的转换工具（在 PATH 中查找）
pub const DEFAULT_CONVERTER: &str = "op_convert";

/// 一次校验运行的配置。缺省值复现 avg_pool2d 的原始用例：
/// 种子 0，输入形状 [1, 12, 128, 127]，严格相等
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// 导出图的名称，同时决定转换产物的文件名
    pub name: String,
    /// 受校验的算子族（`sequence`为空时使用其参数空间）
    pub family: OperatorFamily,
    /// 显式给出的算子序列，优先于`family`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<OperatorSequence>,
    pub seed: u64,
    pub input_shape: Vec<usize>,
    pub converter: PathBuf,
    /// 转换工具超时（秒），缺省时无限等待
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub policy: ComparisonPolicy,
    /// 指定工作目录（不会被删除）；缺省时使用临时目录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
    /// 保留临时工作目录以便检查产物
    pub keep_artifacts: bool,
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            name: "test_avg_pool2d".to_string(),
            family: OperatorFamily::AvgPool2d,
            sequence: None,
            seed: 0,
            input_shape: vec![1, 12, 128, 127],
            converter: PathBuf::from(DEFAULT_CONVERTER),
            timeout_secs: None,
            policy: ComparisonPolicy::Exact,
            work_dir: None,
            keep_artifacts: false,
            log_level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn from_json(json: &str) -> Result<Self, ParityError> {
        serde_json::from_str(json)
            .map_err(|e| ParityError::Configuration(format!("解析配置失败: {e}")))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ParityError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ParityError::Configuration(format!("读取配置文件{}失败: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// 本次运行的算子序列
    pub fn sequence(&self) -> OperatorSequence {
        self.sequence
            .clone()
            .unwrap_or_else(|| parameter_space(self.family))
    }

    pub fn validate(&self) -> Result<(), ParityError> {
        if self.name.is_empty() {
            return Err(ParityError::Configuration("名称不能为空".to_string()));
        }
        if self.input_shape.len() != 4 || self.input_shape.contains(&0) {
            return Err(ParityError::Configuration(format!(
                "输入形状须为各维为正的 4D [N, C, H, W]，得到 {:?}",
                self.input_shape
            )));
        }
        if let ComparisonPolicy::Tolerance { abs, rel } = self.policy {
            if !(abs >= 0.0 && rel >= 0.0) {
                return Err(ParityError::Configuration(format!(
                    "容差须为非负数，得到 abs={abs}，rel={rel}"
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ParityError::Configuration("超时须为正数".to_string()));
        }
        Ok(())
    }
}
