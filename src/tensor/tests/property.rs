use crate::tensor::Tensor;

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓shape↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_compare_shapes_with_same_shapes() {
    let tensor1 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    let tensor2 = Tensor::new(&[5., 6., 7., 8.], &[1, 4]);
    assert!(tensor1.is_same_shape(&tensor2));
}

#[test]
fn test_compare_shapes_with_diff_shapes() {
    let tensor1 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[4]);
    assert!(!tensor1.is_same_shape(&tensor2));

    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[4, 1]);
    assert!(!tensor1.is_same_shape(&tensor2));
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑shape↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

#[test]
fn test_dimension_and_size() {
    let tensor = Tensor::new(&[1.], &[]);
    assert_eq!(tensor.dimension(), 0);
    assert_eq!(tensor.size(), 1);

    let tensor = Tensor::zeros(&[1, 12, 128, 127]);
    assert_eq!(tensor.dimension(), 4);
    assert_eq!(tensor.size(), 12 * 128 * 127);
}

#[test]
fn test_unravel_index() {
    let tensor = Tensor::zeros(&[1, 2, 3, 4]);
    assert_eq!(tensor.unravel_index(0), vec![0, 0, 0, 0]);
    assert_eq!(tensor.unravel_index(5), vec![0, 0, 1, 1]);
    assert_eq!(tensor.unravel_index(23), vec![0, 1, 2, 3]);

    let data: Vec<f32> = (0..24).map(|x| x as f32).collect();
    let tensor = Tensor::new(&data, &[1, 2, 3, 4]);
    for flat in [0, 7, 13, 23] {
        let index = tensor.unravel_index(flat);
        assert_eq!(tensor[[index[0], index[1], index[2], index[3]]], flat as f32);
    }
}
