/*
 * @Date         : 2026-10-17
 * @Description  : 一致性判定：逐元素比较参考输出与候选输出
 *
 * 默认策略为严格相等（与`torch.equal`一致，NaN 不等于任何值）。只有当两条路径以相同顺序、
 * 相同精度完成运算时严格相等才成立；允许转换后模型重排运算时应改用容差策略
 */

use approx::relative_eq;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ParityError;
use crate::tensor::Tensor;


/// 比较策略
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComparisonPolicy {
    /// 逐元素`==`
    #[default]
    Exact,
    /// `|a - b| <= abs`，或相对差不超过`rel`
    Tolerance { abs: f32, rel: f32 },
}

impl ComparisonPolicy {
    fn accepts(&self, reference: f32, candidate: f32) -> bool {
        match *self {
            Self::Exact => reference == candidate,
            Self::Tolerance { abs, rel } => {
                relative_eq!(reference, candidate, epsilon = abs, max_relative = rel)
            }
        }
    }
}

impl fmt::Display for ComparisonPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Tolerance { abs, rel } => write!(f, "tolerance(abs={abs:e}, rel={rel:e})"),
        }
    }
}

/// 不一致时的诊断信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 最大绝对差（任一侧为 NaN 时为 NaN）
    pub max_abs_diff: f32,
    /// 第一个不被策略接受的元素的多维下标；策略全部接受时为第一个不严格相等的元素
    pub first_mismatch: Vec<usize>,
    /// 不被策略接受的元素个数
    pub mismatch_count: usize,
    pub element_count: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} 个元素不一致，最大绝对差 {:e}，首个差异位于 {:?}",
            self.mismatch_count, self.element_count, self.max_abs_diff, self.first_mismatch
        )
    }
}

/// 判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    /// 只要有任何元素不严格相等就给出（即便容差策略判定通过）
    pub diagnostic: Option<Diagnostic>,
}

impl Verdict {
    /// 未通过时转换为数值不一致错误
    pub fn into_result(self) -> Result<Self, ParityError> {
        match (self.passed, &self.diagnostic) {
            (false, Some(diagnostic)) => Err(ParityError::ValueMismatch(diagnostic.clone())),
            _ => Ok(self),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EquivalenceOracle {
    policy: ComparisonPolicy,
}

impl EquivalenceOracle {
    pub const fn new(policy: ComparisonPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> ComparisonPolicy {
        self.policy
    }

    /// 形状不一致直接报错；否则给出判定
    pub fn compare(&self, reference: &Tensor, candidate: &Tensor) -> Result<Verdict, ParityError> {
        if !reference.is_same_shape(candidate) {
            return Err(ParityError::ShapeMismatch {
                expected: reference.shape().to_vec(),
                got: candidate.shape().to_vec(),
                message: "参考输出与候选输出形状不一致".to_string(),
            });
        }

        let mut max_abs_diff = 0.0f32;
        let mut first_unequal = None;
        let mut first_rejected = None;
        let mut mismatch_count = 0;

        let pairs = reference
            .data_as_slice()
            .iter()
            .zip(candidate.data_as_slice());
        for (i, (&a, &b)) in pairs.enumerate() {
            if a == b {
                continue;
            }
            first_unequal.get_or_insert(i);
            let diff = (a - b).abs();
            // NaN 一旦出现就保留
            max_abs_diff = if diff.is_nan() || max_abs_diff.is_nan() {
                f32::NAN
            } else {
                max_abs_diff.max(diff)
            };
            if !self.policy.accepts(a, b) {
                first_rejected.get_or_insert(i);
                mismatch_count += 1;
            }
        }

        let Some(first_unequal) = first_unequal else {
            return Ok(Verdict {
                passed: true,
                diagnostic: None,
            });
        };
        let first = first_rejected.unwrap_or(first_unequal);
        Ok(Verdict {
            passed: mismatch_count == 0,
            diagnostic: Some(Diagnostic {
                max_abs_diff,
                first_mismatch: reference.unravel_index(first),
                mismatch_count,
                element_count: reference.size(),
            }),
        })
    }
}
