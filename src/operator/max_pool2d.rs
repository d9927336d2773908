/*
 * @Date         : 2026-10-17
 * @Description  : 2D 最大池化（等价于 PyTorch 的 F.max_pool2d，不含 dilation）
 *
 * 设计决策：
 * - 输入必须是 4D [N, C, H, W]，输出 [N, C, H', W']
 * - 填充位置视为 -∞，即只在窗口内的有效元素中取最大值
 * - NaN 会传播（与 PyTorch CPU 实现一致）
 * - 使用 Rayon 在 (N, C) 平面维度并行
 */

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OperatorSemantics;
use super::geometry::{Pair2d, PoolGeometry, expect_nchw};
use crate::conversion::descriptor::{PadValue, PrimitiveOp};
use crate::errors::ParityError;
use crate::tensor::Tensor;

const OP_NAME: &str = "MaxPool2d";

/// 最大池化参数（构建后不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MaxPool2dConfigRepr")]
pub struct MaxPool2dConfig {
    kernel_size: Pair2d,
    stride: Pair2d,
    padding: Pair2d,
    ceil_mode: bool,
}

#[derive(Deserialize)]
struct MaxPool2dConfigRepr {
    kernel_size: Pair2d,
    stride: Option<Pair2d>,
    #[serde(default)]
    padding: Option<Pair2d>,
    #[serde(default)]
    ceil_mode: bool,
}

impl TryFrom<MaxPool2dConfigRepr> for MaxPool2dConfig {
    type Error = ParityError;

    fn try_from(repr: MaxPool2dConfigRepr) -> Result<Self, Self::Error> {
        let config = Self {
            kernel_size: repr.kernel_size,
            stride: repr.stride.unwrap_or(repr.kernel_size),
            padding: repr.padding.unwrap_or(Pair2d { h: 0, w: 0 }),
            ceil_mode: repr.ceil_mode,
        };
        config.validate()?;
        Ok(config)
    }
}

impl MaxPool2dConfig {
    /// 以核大小创建：stride 默认等于 kernel_size，padding = 0，ceil_mode = false
    pub fn new(kernel_size: impl Into<Pair2d>) -> Self {
        let kernel_size = kernel_size.into();
        Self {
            kernel_size,
            stride: kernel_size,
            padding: Pair2d { h: 0, w: 0 },
            ceil_mode: false,
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

    pub const fn geometry(&self) -> PoolGeometry {
        PoolGeometry {
            kernel: self.kernel_size,
            stride: self.stride,
            padding: self.padding,
            ceil_mode: self.ceil_mode,
        }
    }
}

impl OperatorSemantics for MaxPool2dConfig {
    fn kind(&self) -> &'static str {
        OP_NAME
    }

    fn validate(&self) -> Result<(), ParityError> {
        self.geometry().validate(OP_NAME)
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

        let planes: Vec<Vec<f32>> = (0..batch_size * channels)
            .into_par_iter()
            .map(|p| {
                let plane = &data[p * plane_size..(p + 1) * plane_size];
                let mut out = Vec::with_capacity(out_h * out_w);
                for row in &rows {
                    for col in &cols {
                        let mut max_val = f32::NEG_INFINITY;
                        for ih in row.start..row.end {
                            for iw in col.start..col.end {
                                let val = plane[ih * in_w + iw];
                                if val > max_val || val.is_nan() {
                                    max_val = val;
                                }
                            }
                        }
                        out.push(max_val);
                    }
                }
                out
            })
            .collect();

        let output: Vec<f32> = planes.into_iter().flatten().collect();
        Ok(Tensor::from_vec(output, &[batch_size, channels, out_h, out_w])?)
    }

    /// 降级为：-∞ 填充 → 窗口取最大值
    fn lower(&self, input_shape: &[usize]) -> Result<Vec<PrimitiveOp>, ParityError> {
        self.validate()?;
        let (_, _, in_h, in_w) = expect_nchw(input_shape, OP_NAME)?;
        let geometry = self.geometry();
        let (out_h, out_w) = geometry.output_hw(in_h, in_w)?;

        Ok(vec![
            PrimitiveOp::Pad {
                top: self.padding.h,
                bottom: geometry.trailing_padding(in_h, out_h, true),
                left: self.padding.w,
                right: geometry.trailing_padding(in_w, out_w, false),
                value: PadValue::NegInfinity,
            },
            PrimitiveOp::WindowMax {
                kernel: self.kernel_size,
                stride: self.stride,
            },
        ])
    }
}

impl fmt::Display for MaxPool2dConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_pool2d(kernel_size={}, stride={}, padding={}, ceil_mode={})",
            self.kernel_size, self.stride, self.padding, self.ceil_mode
        )
    }
}
