
use crate::tensor::Tensor;

/// [1, 1, 4, 4]，值为 1..=16
fn input_4x4() -> Tensor {
    let data: Vec<f32> = (1..=16).map(|x| x as f32).collect();
    Tensor::new(&data, &[1, 1, 4, 4])
}
