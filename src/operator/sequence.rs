/*
 * @Date         : 2026-10-17
 * @Description  : 依次作用于同一张量的非空算子序列
 */

use serde::{Deserialize, Serialize};

use super::{Operator, OperatorSemantics};
use crate::errors::ParityError;

/// 依次作用于同一个张量的算子序列：第 i 步的输出形状即第 i+1 步的输入形状。
/// 序列非空，且每个算子的参数在构建时已校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operator>", into = "Vec<Operator>")]
pub struct OperatorSequence {
    operators: Vec<Operator>,
}

impl OperatorSequence {
    pub fn new(operators: Vec<Operator>) -> Result<Self, ParityError> {
        if operators.is_empty() {
            return Err(ParityError::Configuration("算子序列为空".to_string()));
        }
        for (step, op) in operators.iter().enumerate() {
            op.validate().map_err(|e| match e {
                ParityError::Configuration(msg) => {
                    ParityError::Configuration(format!("第{step}步（{op}）：{msg}"))
                }
                other => other,
            })?;
        }
        Ok(Self { operators })
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operator> {
        self.operators.iter()
    }

    /// 逐步推导形状，返回每一步的输出形状。任何一步的空间尺寸非正都会报配置错误
    pub fn infer_shapes(&self, input_shape: &[usize]) -> Result<Vec<Vec<usize>>, ParityError> {
        let mut shapes = Vec::with_capacity(self.operators.len());
        let mut current = input_shape.to_vec();
        for (step, op) in self.operators.iter().enumerate() {
            current = op.output_shape(&current).map_err(|e| match e {
                ParityError::Configuration(msg) => ParityError::Configuration(format!(
                    "第{step}步（{op}）输入形状为{current:?}：{msg}"
                )),
                other => other,
            })?;
            shapes.push(current.clone());
        }
        Ok(shapes)
    }

    /// 整个序列的最终输出形状
    pub fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ParityError> {
        let mut shapes = self.infer_shapes(input_shape)?;
        // 序列非空
        Ok(shapes.pop().unwrap_or_else(|| input_shape.to_vec()))
    }
}

impl TryFrom<Vec<Operator>> for OperatorSequence {
    type Error = ParityError;

    fn try_from(operators: Vec<Operator>) -> Result<Self, Self::Error> {
        Self::new(operators)
    }
}

impl From<OperatorSequence> for Vec<Operator> {
    fn from(sequence: OperatorSequence) -> Self {
        sequence.operators
    }
}

impl<'a> IntoIterator for &'a OperatorSequence {
    type Item = &'a Operator;
    type IntoIter = std::slice::Iter<'a, Operator>;

    fn into_iter(self) -> Self::IntoIter {
        self.operators.iter()
    }
}
