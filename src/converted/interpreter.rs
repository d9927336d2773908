/*
 * @Date         : 2026-10-17
 * @Description  : 转换后模块的原语解释器
 *
 * 与参考实现相互独立：先显式填充，再对填充后的张量做无填充滑窗。
 * 窗口内按行优先顺序逐个累加（不用 ndarray 的`sum`，其内部分块累加会改变求和顺序），
 * 因此在零填充时与参考实现逐位一致
 */

use ndarray::{Array4, s};

use crate::conversion::descriptor::PrimitiveOp;
use crate::errors::ParityError;
use crate::operator::Pair2d;

/// 执行单个原语
pub(crate) fn execute(op: &PrimitiveOp, x: Array4<f32>) -> Result<Array4<f32>, ParityError> {
    match op {
        PrimitiveOp::Pad {
            top,
            bottom,
            left,
            right,
            value,
        } => Ok(pad(&x, *top, *bottom, *left, *right, value.value())),
        PrimitiveOp::WindowSum { kernel, stride } => {
            window_reduce(&x, *kernel, *stride, 0.0, |acc, v| acc + v)
        }
        PrimitiveOp::WindowMax { kernel, stride } => window_reduce(
            &x,
            *kernel,
            *stride,
            f32::NEG_INFINITY,
            |acc, v| if v > acc || v.is_nan() { v } else { acc },
        ),
        PrimitiveOp::DivideByMap {
            height,
            width,
            divisors,
        } => divide_by_map(x, *height, *width, divisors),
        PrimitiveOp::DivideByScalar { divisor } => {
            if *divisor == 0.0 {
                return Err(ParityError::Load("DivideByScalar 的除数为 0".to_string()));
            }
            let mut x = x;
            x.mapv_inplace(|v| v / divisor);
            Ok(x)
        }
    }
}

fn pad(
    x: &Array4<f32>,
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
    value: f32,
) -> Array4<f32> {
    let (n, c, h, w) = x.dim();
    let mut out = Array4::from_elem((n, c, top + h + bottom, left + w + right), value);
    out.slice_mut(s![.., .., top..top + h, left..left + w])
        .assign(x);
    out
}

fn window_reduce(
    x: &Array4<f32>,
    kernel: Pair2d,
    stride: Pair2d,
    init: f32,
    reduce: impl Fn(f32, f32) -> f32,
) -> Result<Array4<f32>, ParityError> {
    let (n, c, h, w) = x.dim();
    if kernel.h == 0 || kernel.w == 0 || stride.h == 0 || stride.w == 0 {
        return Err(ParityError::Load(format!(
            "滑窗参数非法：核{kernel}，步长{stride}"
        )));
    }
    if kernel.h > h || kernel.w > w {
        return Err(ParityError::Load(format!(
            "滑窗核{kernel}超出填充后的输入尺寸({h}, {w})"
        )));
    }
    let out_h = (h - kernel.h) / stride.h + 1;
    let out_w = (w - kernel.w) / stride.w + 1;

    let mut out = Array4::<f32>::zeros((n, c, out_h, out_w));
    for ((b, ch, oh, ow), v) in out.indexed_iter_mut() {
        let (h0, w0) = (oh * stride.h, ow * stride.w);
        let window = x.slice(s![b, ch, h0..h0 + kernel.h, w0..w0 + kernel.w]);
        *v = window.iter().fold(init, |acc, &val| reduce(acc, val));
    }
    Ok(out)
}

fn divide_by_map(
    mut x: Array4<f32>,
    height: usize,
    width: usize,
    divisors: &[f32],
) -> Result<Array4<f32>, ParityError> {
    let (_, _, h, w) = x.dim();
    if (h, w) != (height, width) || divisors.len() != height * width {
        return Err(ParityError::Load(format!(
            "除数表尺寸({height}, {width})（{}项）与输入空间尺寸({h}, {w})不一致",
            divisors.len()
        )));
    }
    for ((_, _, i, j), v) in x.indexed_iter_mut() {
        let divisor = divisors[i * width + j];
        // 窗口完全落在填充区时没有有效元素，输出 0
        *v = if divisor == 0.0 { 0.0 } else { *v / divisor };
    }
    Ok(x)
}
