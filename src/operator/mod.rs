//! # 算子语义
//!
//! 每种算子只需实现[`OperatorSemantics`]（参考实现 + 降级规则）并提供一个参数空间，
//! 即可接入整条“参考 vs 转换”一致性校验流水线，无需新增流水线逻辑。

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conversion::descriptor::PrimitiveOp;
use crate::errors::ParityError;
use crate::tensor::Tensor;

mod avg_pool2d;
pub mod geometry;
mod max_pool2d;
pub mod param_space;
mod sequence;

pub use self::avg_pool2d::AvgPool2dConfig;
pub use self::geometry::{Pair2d, PoolGeometry};
pub use self::max_pool2d::MaxPool2dConfig;
pub use self::param_space::{OperatorFamily, parameter_space};
pub use self::sequence::OperatorSequence;

#[cfg(test)]
mod tests;

/// 算子语义：同一份参数既能在参考实现中执行，也能降级成转换后模型使用的原语
#[enum_dispatch]
pub trait OperatorSemantics {
    /// 算子类型名（与交换格式中的`type`标签一致）
    fn kind(&self) -> &'static str;

    /// 执行前校验参数
    fn validate(&self) -> Result<(), ParityError>;

    /// 由输入形状推出输出形状
    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ParityError>;

    /// 受信任的参考实现
    fn reference_forward(&self, input: &Tensor) -> Result<Tensor, ParityError>;

    /// 降级为原语序列（供转换工具使用）
    fn lower(&self, input_shape: &[usize]) -> Result<Vec<PrimitiveOp>, ParityError>;
}

/// 交换格式中的单个算子
#[enum_dispatch(OperatorSemantics)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operator {
    AvgPool2d(AvgPool2dConfig),
    MaxPool2d(MaxPool2dConfig),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AvgPool2d(config) => config.fmt(f),
            Self::MaxPool2d(config) => config.fmt(f),
        }
    }
}
