/*
 * @Date         : 2026-10-17
 * @Description  : 参考执行器：按顺序对同一个张量逐步应用算子序列，得到参考输出
 *
 * 参考实现与转换后模型的实现互相独立：前者直接按下标裁剪窗口，后者先显式填充再滑窗
 */

use log::debug;

use crate::errors::ParityError;
use crate::operator::{OperatorSemantics, OperatorSequence};
use crate::tensor::Tensor;


#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceExecutor;

impl ReferenceExecutor {
    pub const fn new() -> Self {
        Self
    }

    /// 对`input`依次应用`sequence`中的每个算子。
    /// 执行前先推导全部形状，任何一步非法都会在计算开始前报配置错误。
    pub fn run(&self, input: &Tensor, sequence: &OperatorSequence) -> Result<Tensor, ParityError> {
        let shapes = sequence.infer_shapes(input.shape())?;

        let mut steps = sequence.iter().zip(shapes.iter());
        let Some((first, first_shape)) = steps.next() else {
            return Err(ParityError::Configuration("算子序列为空".to_string()));
        };
        let mut current = first.reference_forward(input)?;
        debug!("参考执行 第0步 {first} → {first_shape:?}");

        for (step, (op, shape)) in steps.enumerate() {
            current = op.reference_forward(&current)?;
            debug!("参考执行 第{}步 {op} → {shape:?}", step + 1);
        }
        Ok(current)
    }
}
