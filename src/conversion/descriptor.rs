/*
 * @Date         : 2026-10-17
 * @Description  : 交换格式（IR）
 *
 * - `ExportedGraph`：导出端写出的图（`<name>.json` + `<name>.input.npy`），交给外部转换工具
 * - `ConvertedModuleDescriptor`：转换工具产出的模块（`<name>_converted.json` +
 *   `<name>_converted.npy`），由转换后执行器加载
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ParityError;
use crate::operator::{OperatorSequence, Pair2d};

/// 格式版本（用于向后兼容）
pub const FORMAT_VERSION: u32 = 1;

/// 转换产物文件名后缀：`<stem>_converted.json` / `<stem>_converted.npy`
pub const CONVERTED_SUFFIX: &str = "_converted";

/// 导出的图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedGraph {
    pub format_version: u32,
    /// 图名称
    pub name: String,
    /// 声明的输入形状
    pub input_shape: Vec<usize>,
    /// 输入张量文件（相对于 JSON 文件）
    pub input_file: String,
    /// 依次执行的算子
    pub operators: OperatorSequence,
}

/// 转换后模块：按原算子分段的原语序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedModuleDescriptor {
    pub format_version: u32,
    /// 来源图名称
    pub source: String,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    /// 内嵌输入的参数文件（相对于 JSON 文件）
    pub param_file: String,
    pub stages: Vec<LoweredStage>,
}

/// 一个原算子降级后的原语段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoweredStage {
    /// 原算子的可读描述
    pub source_op: String,
    pub output_shape: Vec<usize>,
    pub ops: Vec<PrimitiveOp>,
}

/// 填充值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadValue {
    Zero,
    /// JSON 无法表示 -∞，故用标签代替具体数值
    NegInfinity,
}

impl PadValue {
    pub const fn value(self) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::NegInfinity => f32::NEG_INFINITY,
        }
    }
}

/// 转换后模型使用的原语（均作用于 4D [N, C, H, W] 张量的空间维度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum PrimitiveOp {
    /// 显式填充
    Pad {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        value: PadValue,
    },
    /// 无填充滑窗求和（窗口内按行优先顺序累加）
    WindowSum { kernel: Pair2d, stride: Pair2d },
    /// 无填充滑窗取最大值
    WindowMax { kernel: Pair2d, stride: Pair2d },
    /// 逐空间位置除以常量折叠得到的除数表（形状 [height, width]，对所有 N、C 广播）
    DivideByMap {
        height: usize,
        width: usize,
        divisors: Vec<f32>,
    },
    /// 除以同一个常数
    DivideByScalar { divisor: f32 },
}

impl ExportedGraph {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ConvertedModuleDescriptor {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 由导出图文件推出转换产物的两个路径：(模块, 参数文件)
pub fn converted_paths(graph_path: &Path) -> Result<(PathBuf, PathBuf), ParityError> {
    let stem = graph_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| {
            ParityError::Conversion(format!("无法从{}得到文件名", graph_path.display()))
        })?;
    let dir = graph_path.parent().unwrap_or_else(|| Path::new(""));
    Ok((
        dir.join(format!("{stem}{CONVERTED_SUFFIX}.json")),
        dir.join(format!("{stem}{CONVERTED_SUFFIX}.npy")),
    ))
}
