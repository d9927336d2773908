/*
 * @Date         : 2026-10-17
 * @Description  : 各算子的参数空间：覆盖参数各维度边界组合的固定算子序列
 *
 * avg_pool2d 覆盖：
 * - 标量简写与逐维度取值
 * - ceil_mode、count_include_pad 两种取值
 * - divisor_override
 * - 步长小于、等于、大于核大小
 * - 有/无填充
 * - ceil 模式下丢弃越界窗口
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AvgPool2dConfig, MaxPool2dConfig, Operator, OperatorSequence};

/// 受校验的算子族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OperatorFamily {
    #[default]
    #[value(name = "avg_pool2d")]
    AvgPool2d,
    #[value(name = "max_pool2d")]
    MaxPool2d,
}

impl fmt::Display for OperatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AvgPool2d => write!(f, "avg_pool2d"),
            Self::MaxPool2d => write!(f, "max_pool2d"),
        }
    }
}

/// 按算子族选取参数空间
pub fn parameter_space(family: OperatorFamily) -> OperatorSequence {
    match family {
        OperatorFamily::AvgPool2d => avg_pool2d_parameter_space(),
        OperatorFamily::MaxPool2d => max_pool2d_parameter_space(),
    }
}

pub fn avg_pool2d_parameter_space() -> OperatorSequence {
    let operators = vec![
        AvgPool2dConfig::new(3),
        AvgPool2dConfig::new(4).with_stride(2).with_padding(2),
        AvgPool2dConfig::new((1, 3))
            .with_stride(1)
            .with_padding((0, 1))
            .with_ceil_mode(false)
            .with_count_include_pad(true),
        AvgPool2dConfig::new((4, 5))
            .with_stride((1, 2))
            .with_padding((1, 2))
            .with_ceil_mode(true)
            .with_count_include_pad(false),
        AvgPool2dConfig::new((5, 3))
            .with_stride((2, 1))
            .with_padding(1)
            .with_ceil_mode(false)
            .with_count_include_pad(true),
        AvgPool2dConfig::new(2)
            .with_stride(1)
            .with_padding(0)
            .with_ceil_mode(true)
            .with_count_include_pad(true),
        AvgPool2dConfig::new((5, 4))
            .with_stride(1)
            .with_padding(2)
            .with_ceil_mode(false)
            .with_count_include_pad(false)
            .with_divisor_override(18),
        // 步长大于核；宽度方向最后一个窗口越界被丢弃
        AvgPool2dConfig::new((2, 1))
            .with_stride((3, 2))
            .with_padding((1, 0))
            .with_ceil_mode(true)
            .with_count_include_pad(false),
    ];
    static_sequence(operators.into_iter().map(Operator::from).collect())
}

pub fn max_pool2d_parameter_space() -> OperatorSequence {
    let operators = vec![
        MaxPool2dConfig::new(3),
        MaxPool2dConfig::new((2, 3))
            .with_stride((1, 2))
            .with_padding(1)
            .with_ceil_mode(true),
        MaxPool2dConfig::new(2).with_stride(3).with_padding(1),
        MaxPool2dConfig::new((3, 2))
            .with_stride(1)
            .with_padding((1, 0))
            .with_ceil_mode(true),
        MaxPool2dConfig::new(2).with_stride((3, 2)).with_ceil_mode(true),
    ];
    static_sequence(operators.into_iter().map(Operator::from).collect())
}

/// 参数空间是静态数据，各参数均已满足约束
fn static_sequence(operators: Vec<Operator>) -> OperatorSequence {
    match OperatorSequence::new(operators) {
        Ok(sequence) => sequence,
        Err(e) => panic!("内置参数空间非法：{e}"),
    }
}
