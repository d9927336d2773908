use super::Tensor;
use std::ops::Index;

// 引用式索引：`tensor[[n, c, h, w]]`
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &Self::Output {
        assert!(
            N == self.dimension(),
            "索引维度数{}与张量阶数{}不一致",
            N,
            self.dimension()
        );
        &self.data[&index[..]]
    }
}
