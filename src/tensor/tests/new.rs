use crate::assert_panic;
use crate::errors::TensorError;
use crate::tensor::Tensor;
use ndarray::{Array, IxDyn};

#[test]
fn test_new_with_different_ranks() {
    let tensor = Tensor::new(&[1.], &[]);
    assert_eq!(tensor.shape(), &[] as &[usize]);
    assert_eq!(
        tensor.data,
        Array::from_shape_vec(IxDyn(&[]), vec![1.]).unwrap()
    );

    let tensor = Tensor::new(&[1., 2., 3.], &[3]);
    assert_eq!(tensor.shape(), &[3]);

    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor[[1, 0]], 4.);

    let data: Vec<f32> = (0..24).map(|x| x as f32).collect();
    let tensor = Tensor::new(&data, &[1, 2, 3, 4]);
    assert_eq!(tensor.shape(), &[1, 2, 3, 4]);
    // 行优先
    assert_eq!(tensor[[0, 1, 2, 3]], 23.);
    assert_eq!(tensor[[0, 1, 0, 0]], 12.);
}

#[test]
fn test_new_with_mismatched_data_len() {
    assert_panic!(
        Tensor::new(&[1., 2.], &[1, 1, 1]),
        "数据长度为2，与形状[1, 1, 1]所需的1个元素不一致"
    );
    assert_eq!(
        Tensor::try_new(&[1., 2., 3.], &[2, 2]),
        Err(TensorError::DataShapeMismatch {
            data_len: 3,
            shape: vec![2, 2],
            expected: 4,
        })
    );
}

#[test]
fn test_zeros() {
    let tensor = Tensor::zeros(&[1, 2, 3, 3]);
    assert_eq!(tensor.size(), 18);
    assert!(tensor.data_as_slice().iter().all(|&x| x == 0.));
}

#[test]
fn test_new_random_seeded_is_deterministic() {
    let shape = [1, 12, 8, 7];
    let a = Tensor::new_random_seeded(0., 1., &shape, 0);
    let b = Tensor::new_random_seeded(0., 1., &shape, 0);
    assert_eq!(a, b);
    assert_eq!(a.shape(), &shape);
    // [0, 1) 左闭右开
    assert!(a.data_as_slice().iter().all(|&x| (0. ..1.).contains(&x)));

    let c = Tensor::new_random_seeded(0., 1., &shape, 1);
    assert_ne!(a, c);
}

#[test]
fn test_new_random_seeded_with_invalid_range() {
    assert_panic!(
        Tensor::new_random_seeded(1., 1., &[2, 2], 0),
        "随机区间须满足 min < max，得到 [1, 1)"
    );
}

#[test]
fn test_from_array_keeps_standard_layout() {
    let data: Vec<f32> = (0..6).map(|x| x as f32).collect();
    let array = Array::from_shape_vec(IxDyn(&[2, 3]), data).unwrap();
    // 转置后是非标准布局
    let tensor = Tensor::from_array(array.reversed_axes());
    assert_eq!(tensor.shape(), &[3, 2]);
    assert_eq!(tensor.data_as_slice(), &[0., 3., 1., 4., 2., 5.]);
}
