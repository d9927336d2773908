/*
 * @Date         : 2026-10-17
 * @Description  : 一致性校验流水线的错误分类
 *
 * 各阶段错误一律向上传播到 Harness，由其转换为非零退出码；流水线内部不做任何恢复或重试
 */

use super::TensorError;
use crate::oracle::Diagnostic;
use thiserror::Error;

/// 流水线错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParityError {
    /// 算子参数非法（执行前即可发现）
    #[error("配置错误：{0}")]
    Configuration(String),

    /// 外部转换工具失败（不重试）
    #[error("转换错误：{0}")]
    Conversion(String),

    /// 转换产物无法加载/实例化
    #[error("加载错误：{0}")]
    Load(String),

    /// 参考输出与候选输出结构不一致（先于数值比较检查）
    #[error("形状不匹配：期望 {expected:?}，实际 {got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 数值不一致
    #[error("数值不一致：{0}")]
    ValueMismatch(Diagnostic),

    #[error("张量错误：{0}")]
    Tensor(#[from] TensorError),
}

impl ParityError {
    /// 出错的阶段名，用于日志
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Conversion(_) => "conversion",
            Self::Load(_) => "load",
            Self::ShapeMismatch { .. } => "shape-check",
            Self::ValueMismatch(_) => "oracle",
            Self::Tensor(_) => "tensor",
        }
    }
}
