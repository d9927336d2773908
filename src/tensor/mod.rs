use ndarray::{Array, ArrayD, IxDyn};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::errors::TensorError;

mod ops {
    pub mod eq;
}

mod index;
mod print;
mod property;
mod save_load;

#[cfg(test)]
mod tests;

/// 定义张量的结构体：行优先（row-major）存储的稠密`f32`数组，带显式形状。
/// 流水线中每个张量只归产生它的执行器所有，创建后不再修改。
/// 注：内部数组始终保持标准（行优先、连续）布局，所有构造函数都保证这一点。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量。`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic；
    /// 需要可恢复的错误时请用[`Tensor::try_new`]。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        match Self::try_new(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Tensor, TensorError> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// 与[`Tensor::try_new`]相同，但直接接管`data`的所有权（不拷贝）
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Tensor, TensorError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
                expected,
            });
        }
        let data = Array::from_shape_vec(IxDyn(shape), data)
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Tensor { data })
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 用固定种子创建一个随机张量，其值在[min, max)的左闭右开区间（与`torch.rand`的[0, 1)一致）。
    /// 同一`seed`与`shape`总是得到逐位相同的结果。
    /// `min`必须小于`max`，否则会panic。
    pub fn new_random_seeded(min: f32, max: f32, shape: &[usize], seed: u64) -> Tensor {
        assert!(min < max, "{}", TensorError::InvalidRange { min, max });
        let mut rng = StdRng::seed_from_u64(seed);
        let uniform = Uniform::new(min, max);
        Tensor {
            data: Array::from_shape_simple_fn(IxDyn(shape), || uniform.sample(&mut rng)),
        }
    }

    /// 由`ndarray`数组构建，统一转换为标准布局
    pub(crate) fn from_array(data: ArrayD<f32>) -> Tensor {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Tensor { data }
    }
}
