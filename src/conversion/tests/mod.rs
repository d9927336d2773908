
use crate::tensor::Tensor;

/// 参数空间可在该形状上完整执行，且足够小
const SMALL_SHAPE: [usize; 4] = [1, 2, 40, 37];

fn small_input() -> Tensor {
    Tensor::new_random_seeded(0., 1., &SMALL_SHAPE, 0)
}
