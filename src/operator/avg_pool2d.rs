/*
 * @Date         : 2026-10-17
 * @Description  : 2D 平均池化（等价于 PyTorch 的 F.avg_pool2d）
 *
 * 设计决策：
 * - 输入必须是 4D [N, C, H, W]，输出 [N, C, H', W']
 * - 参考实现只对窗口内的有效元素按行优先顺序逐个累加，再除以除数
 * - 除数：divisor_override > count_include_pad ? 计入填充的窗口面积 : 有效元素个数
 * - 使用 Rayon 在 (N, C) 平面维度并行；每个输出元素仍由单一顺序循环得到，结果逐位确定
 */

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OperatorSemantics;
use super::geometry::{Pair2d, PoolGeometry, expect_nchw};
use crate::conversion::descriptor::{PadValue, PrimitiveOp};
use crate::errors::ParityError;
use crate::tensor::Tensor;

const OP_NAME: &str = "AvgPool2d";

/// 平均池化参数（构建后不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AvgPool2dConfigRepr")]
pub struct AvgPool2dConfig {
    kernel_size: Pair2d,
    stride: Pair2d,
    padding: Pair2d,
    ceil_mode: bool,
    count_include_pad: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    divisor_override: Option<u32>,
}

/// 反序列化用：`stride`缺省时取`kernel_size`，其余字段取 PyTorch 的默认值
#[derive(Deserialize)]
struct AvgPool2dConfigRepr {
    kernel_size: Pair2d,
    stride: Option<Pair2d>,
    #[serde(default)]
    padding: Option<Pair2d>,
    #[serde(default)]
    ceil_mode: bool,
    #[serde(default = "default_count_include_pad")]
    count_include_pad: bool,
    #[serde(default)]
    divisor_override: Option<u32>,
}

const fn default_count_include_pad() -> bool {
    true
}

impl TryFrom<AvgPool2dConfigRepr> for AvgPool2dConfig {
    type Error = ParityError;

    fn try_from(repr: AvgPool2dConfigRepr) -> Result<Self, Self::Error> {
        let config = Self {
            kernel_size: repr.kernel_size,
            stride: repr.stride.unwrap_or(repr.kernel_size),
            padding: repr.padding.unwrap_or(Pair2d { h: 0, w: 0 }),
            ceil_mode: repr.ceil_mode,
            count_include_pad: repr.count_include_pad,
            divisor_override: repr.divisor_override,
        };
        config.validate()?;
        Ok(config)
    }
}

impl AvgPool2dConfig {
    /// 以核大小创建，其余参数取默认值：stride = kernel_size，padding = 0，
    /// ceil_mode = false，count_include_pad = true，无 divisor_override
    pub fn new(kernel_size: impl Into<Pair2d>) -> Self {
        let kernel_size = kernel_size.into();
        Self {
            kernel_size,
            stride: kernel_size,
            padding: Pair2d { h: 0, w: 0 },
            ceil_mode: false,
            count_include_pad: true,
            divisor_override: None,
        }
    }

    pub fn with_stride(mut self, stride: impl Into<Pair2d>) -> Self {
        self.stride = stride.into();
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Pair2d>) -> Self {
        self.padding = padding.into();
        self
    }

    pub const fn with_ceil_mode(mut self, ceil_mode: bool) -> Self {
        self.ceil_mode = ceil_mode;
        self
    }

    pub const fn with_count_include_pad(mut self, count_include_pad: bool) -> Self {
        self.count_include_pad = count_include_pad;
        self
    }

    pub const fn with_divisor_override(mut self, divisor: u32) -> Self {
        self.divisor_override = Some(divisor);
        self
    }

    pub const fn kernel_size(&self) -> Pair2d {
        self.kernel_size
    }

    pub const fn stride(&self) -> Pair2d {
        self.stride
    }

    pub const fn padding(&self) -> Pair2d {
        self.padding
    }

    pub const fn ceil_mode(&self) -> bool {
        self.ceil_mode
    }

    pub const fn count_include_pad(&self) -> bool {
        self.count_include_pad
    }

    pub const fn divisor_override(&self) -> Option<u32> {
        self.divisor_override
    }

    pub const fn geometry(&self) -> PoolGeometry {
        PoolGeometry {
            kernel: self.kernel_size,
            stride: self.stride,
            padding: self.padding,
            ceil_mode: self.ceil_mode,
        }
    }

    /// 某个窗口的除数
    fn divisor(&self, rows: usize, cols: usize, padded_rows: usize, padded_cols: usize) -> usize {
        match self.divisor_override {
            Some(divisor) => divisor as usize,
            None if self.count_include_pad => padded_rows * padded_cols,
            None => rows * cols,
        }
    }
}

impl OperatorSemantics for AvgPool2dConfig {
    fn kind(&self) -> &'static str {
        OP_NAME
    }

    fn validate(&self) -> Result<(), ParityError> {
        self.geometry().validate(OP_NAME)?;
        if self.divisor_override == Some(0) {
            return Err(ParityError::Configuration(format!(
                "{OP_NAME} 的 divisor_override 须为正数"
            )));
        }
        Ok(())
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ParityError> {
        let (n, c, in_h, in_w) = expect_nchw(input_shape, OP_NAME)?;
        let (out_h, out_w) = self.geometry().output_hw(in_h, in_w)?;
        Ok(vec![n, c, out_h, out_w])
    }

    fn reference_forward(&self, input: &Tensor) -> Result<Tensor, ParityError> {
        self.validate()?;
        let (batch_size, channels, in_h, in_w) = expect_nchw(input.shape(), OP_NAME)?;
        let geometry = self.geometry();
        let (out_h, out_w) = geometry.output_hw(in_h, in_w)?;

        let rows: Vec<_> = (0..out_h).map(|oh| geometry.window_h(oh, in_h)).collect();
        let cols: Vec<_> = (0..out_w).map(|ow| geometry.window_w(ow, in_w)).collect();
        let data = input.data_as_slice();
        let plane_size = in_h * in_w;

        // Rayon 并行处理每个 (n, c) 平面
        let planes: Vec<Vec<f32>> = (0..batch_size * channels)
            .into_par_iter()
            .map(|p| {
                let plane = &data[p * plane_size..(p + 1) * plane_size];
                let mut out = Vec::with_capacity(out_h * out_w);
                for row in &rows {
                    for col in &cols {
                        if row.is_empty() || col.is_empty() {
                            out.push(0.0);
                            continue;
                        }
                        let mut sum = 0.0f32;
                        for ih in row.start..row.end {
                            for iw in col.start..col.end {
                                sum += plane[ih * in_w + iw];
                            }
                        }
                        let divisor =
                            self.divisor(row.len(), col.len(), row.padded_len, col.padded_len);
                        out.push(sum / divisor as f32);
                    }
                }
                out
            })
            .collect();

        let output: Vec<f32> = planes.into_iter().flatten().collect();
        Ok(Tensor::from_vec(output, &[batch_size, channels, out_h, out_w])?)
    }

    /// 降级为：零填充 → 窗口求和 → 除以（常量折叠后的）除数
    fn lower(&self, input_shape: &[usize]) -> Result<Vec<PrimitiveOp>, ParityError> {
        self.validate()?;
        let (_, _, in_h, in_w) = expect_nchw(input_shape, OP_NAME)?;
        let geometry = self.geometry();
        let (out_h, out_w) = geometry.output_hw(in_h, in_w)?;

        let mut ops = vec![
            PrimitiveOp::Pad {
                top: self.padding.h,
                bottom: geometry.trailing_padding(in_h, out_h, true),
                left: self.padding.w,
                right: geometry.trailing_padding(in_w, out_w, false),
                value: PadValue::Zero,
            },
            PrimitiveOp::WindowSum {
                kernel: self.kernel_size,
                stride: self.stride,
            },
        ];

        match self.divisor_override {
            Some(divisor) => ops.push(PrimitiveOp::DivideByScalar {
                divisor: divisor as f32,
            }),
            None => {
                let mut divisors = Vec::with_capacity(out_h * out_w);
                for oh in 0..out_h {
                    let row = geometry.window_h(oh, in_h);
                    for ow in 0..out_w {
                        let col = geometry.window_w(ow, in_w);
                        let divisor =
                            self.divisor(row.len(), col.len(), row.padded_len, col.padded_len);
                        divisors.push(divisor as f32);
                    }
                }
                ops.push(PrimitiveOp::DivideByMap {
                    height: out_h,
                    width: out_w,
                    divisors,
                });
            }
        }
        Ok(ops)
    }
}

impl fmt::Display for AvgPool2dConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg_pool2d(kernel_size={}, stride={}, padding={}, ceil_mode={}, count_include_pad={}",
            self.kernel_size, self.stride, self.padding, self.ceil_mode, self.count_include_pad
        )?;
        if let Some(divisor) = self.divisor_override {
            write!(f, ", divisor_override={divisor}")?;
        }
        write!(f, ")")
    }
}
