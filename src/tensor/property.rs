/*
 * @Date         : 2026-10-17
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;
use ndarray::{ArrayD, ArrayViewD};

impl Tensor {
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]，池化类算子使用[N, C, H, W]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 按行优先顺序返回底层数据
    pub fn data_as_slice(&self) -> &[f32] {
        // 构造时已保证标准布局
        self.data.as_slice().unwrap_or_default()
    }

    /// 将行优先的扁平下标换算成多维下标
    pub fn unravel_index(&self, flat_index: usize) -> Vec<usize> {
        let mut rest = flat_index;
        let mut index = vec![0; self.dimension()];
        for (axis, &extent) in self.shape().iter().enumerate().rev() {
            if extent == 0 {
                continue;
            }
            index[axis] = rest % extent;
            rest /= extent;
        }
        index
    }

    pub(crate) fn as_array(&self) -> &ArrayD<f32> {
        &self.data
    }
}
