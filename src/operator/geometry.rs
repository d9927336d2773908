/*
 * @Date         : 2026-10-17
 * @Description  : 2D 池化窗口几何（PyTorch 风格）
 *
 * 每个空间维度独立计算：
 * - floor 模式：out = floor((in + 2p - k) / s) + 1
 * - ceil 模式：out = ceil((in + 2p - k) / s) + 1，且若最后一个窗口的起点已越过未填充的输入
 *   （即 (out - 1) * s >= in + p），则丢弃该窗口
 * - 窗口 [o*s - p, min(o*s - p + k, in + p)) 的长度即 count_include_pad 时的除数分量；
 *   ceil 模式额外延伸出的尾部（越过 in + p 的部分）不计入
 */

use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ParityError;

/// 二维参数（高、宽）。标量简写`k`等价于`(k, k)`；序列化时总是写成`[h, w]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Pair2dRepr", into = "[usize; 2]")]
pub struct Pair2d {
    pub h: usize,
    pub w: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Pair2dRepr {
    Scalar(usize),
    Pair([usize; 2]),
}

impl From<Pair2dRepr> for Pair2d {
    fn from(repr: Pair2dRepr) -> Self {
        match repr {
            Pair2dRepr::Scalar(v) => v.into(),
            Pair2dRepr::Pair([h, w]) => (h, w).into(),
        }
    }
}

impl From<Pair2d> for [usize; 2] {
    fn from(pair: Pair2d) -> Self {
        [pair.h, pair.w]
    }
}

impl From<usize> for Pair2d {
    fn from(v: usize) -> Self {
        Self { h: v, w: v }
    }
}

impl From<(usize, usize)> for Pair2d {
    fn from((h, w): (usize, usize)) -> Self {
        Self { h, w }
    }
}

impl fmt::Display for Pair2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.h, self.w)
    }
}

/// 单个维度上的一个池化窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// 裁剪到[0, in)后的起点
    pub start: usize,
    /// 裁剪到[0, in)后的终点（不含）
    pub end: usize,
    /// 计入填充时的窗口长度（不含 ceil 模式延伸出的尾部）
    pub padded_len: usize,
}

impl Window {
    /// 窗口内有效（非填充）元素个数
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 池化几何参数：核、步长、填充与取整模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolGeometry {
    pub kernel: Pair2d,
    pub stride: Pair2d,
    pub padding: Pair2d,
    pub ceil_mode: bool,
}

impl PoolGeometry {
    /// 校验参数：核与步长须为正，填充不得超过核大小的一半
    pub fn validate(&self, op_name: &str) -> Result<(), ParityError> {
        let dims = [
            ("高", self.kernel.h, self.stride.h, self.padding.h),
            ("宽", self.kernel.w, self.stride.w, self.padding.w),
        ];
        for (dim, kernel, stride, padding) in dims {
            if kernel == 0 {
                return Err(ParityError::Configuration(format!(
                    "{op_name} 的核在{dim}维度上须为正数"
                )));
            }
            if stride == 0 {
                return Err(ParityError::Configuration(format!(
                    "{op_name} 的步长在{dim}维度上须为正数"
                )));
            }
            if padding > kernel / 2 {
                return Err(ParityError::Configuration(format!(
                    "{op_name} 的填充在{dim}维度上为{padding}，超过了核大小{kernel}的一半"
                )));
            }
        }
        Ok(())
    }

    /// 计算输出的空间尺寸 (H', W')
    pub fn output_hw(&self, in_h: usize, in_w: usize) -> Result<(usize, usize), ParityError> {
        let out_h = output_extent(
            in_h,
            self.kernel.h,
            self.stride.h,
            self.padding.h,
            self.ceil_mode,
        )?;
        let out_w = output_extent(
            in_w,
            self.kernel.w,
            self.stride.w,
            self.padding.w,
            self.ceil_mode,
        )?;
        Ok((out_h, out_w))
    }

    pub fn window_h(&self, oh: usize, in_h: usize) -> Window {
        window(oh, in_h, self.kernel.h, self.stride.h, self.padding.h)
    }

    pub fn window_w(&self, ow: usize, in_w: usize) -> Window {
        window(ow, in_w, self.kernel.w, self.stride.w, self.padding.w)
    }

    /// 显式填充时每个维度末尾需要补的长度，使`out`个窗口恰好铺满填充后的输入。
    /// floor 模式下不超过`padding`，ceil 模式下可能更长
    pub fn trailing_padding(&self, input: usize, out: usize, along_h: bool) -> usize {
        let (kernel, stride, padding) = if along_h {
            (self.kernel.h, self.stride.h, self.padding.h)
        } else {
            (self.kernel.w, self.stride.w, self.padding.w)
        };
        ((out - 1) * stride + kernel).saturating_sub(input + padding)
    }
}

/// 单个维度上的输出长度
pub fn output_extent(
    input: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    ceil_mode: bool,
) -> Result<usize, ParityError> {
    if input == 0 {
        return Err(ParityError::Configuration("输入的空间尺寸须为正数".to_string()));
    }
    if stride == 0 {
        return Err(ParityError::Configuration("步长须为正数".to_string()));
    }
    let (input, kernel, stride, padding) =
        (input as i64, kernel as i64, stride as i64, padding as i64);

    let span = input + 2 * padding - kernel;
    if span < 0 {
        return Err(ParityError::Configuration(format!(
            "核大小{kernel}超过了填充后的输入长度{}，输出尺寸将非正",
            input + 2 * padding
        )));
    }

    let mut out = if ceil_mode {
        Integer::div_ceil(&span, &stride) + 1
    } else {
        Integer::div_floor(&span, &stride) + 1
    };
    // 最后一个窗口必须从未填充的输入（或左侧填充）内开始
    if ceil_mode && (out - 1) * stride >= input + padding {
        out -= 1;
    }
    Ok(out as usize)
}

/// 第`o`个输出位置对应的窗口
pub fn window(o: usize, input: usize, kernel: usize, stride: usize, padding: usize) -> Window {
    let (input, kernel, padding) = (input as i64, kernel as i64, padding as i64);
    let start = (o * stride) as i64 - padding;
    let end = (start + kernel).min(input + padding);
    let padded_len = (end - start).max(0) as usize;
    let start = start.max(0);
    let end = end.min(input);
    Window {
        start: start as usize,
        end: end.max(start) as usize,
        padded_len,
    }
}

/// 池化类算子的输入必须是 4D [N, C, H, W]
pub fn expect_nchw(
    shape: &[usize],
    op_name: &str,
) -> Result<(usize, usize, usize, usize), ParityError> {
    match shape {
        &[n, c, h, w] => {
            if h == 0 || w == 0 {
                return Err(ParityError::Configuration(format!(
                    "{op_name} 的输入空间尺寸须为正数，得到 {shape:?}"
                )));
            }
            Ok((n, c, h, w))
        }
        _ => Err(ParityError::Configuration(format!(
            "{op_name} 输入必须是 4D [N, C, H, W]，得到 {shape:?}"
        ))),
    }
}
