/*
 * @Date         : 2026-10-17
 * @Description  : 转换后执行器的单元测试
 *
 * 测试策略：
 * 1. 原语解释器与参考实现逐位一致（两个参数空间、随机输入）
 * 2. 单个原语的手算结果
 * 3. 加载失败与内嵌输入/形状不一致
 */

use approx::assert_abs_diff_eq;
use ndarray::Array4;

use super::interpreter::execute;
use super::{ArtifactLoader, ConvertedExecutor, LoadedModule, LoweredModule, LoweredModuleLoader};
use crate::assert_err;
use crate::conversion::descriptor::{ExportedGraph, FORMAT_VERSION, PadValue, PrimitiveOp};
use crate::conversion::lowering::{convert_graph_file, lower_graph};
use crate::conversion::{ConversionArtifact, GraphExporter};
use crate::errors::ParityError;
use crate::operator::param_space::{avg_pool2d_parameter_space, max_pool2d_parameter_space};
use crate::operator::{OperatorSequence, Pair2d};
use crate::reference::ReferenceExecutor;
use crate::tensor::Tensor;

const SMALL_SHAPE: [usize; 4] = [2, 3, 40, 37];

/// 不经过文件，直接由算子序列构建转换后模块
fn lowered_module(sequence: &OperatorSequence, input: &Tensor) -> Result<LoweredModule, ParityError> {
    let graph = ExportedGraph {
        format_version: FORMAT_VERSION,
        name: "in_memory".to_string(),
        input_shape: input.shape().to_vec(),
        input_file: "in_memory.input.npy".to_string(),
        operators: sequence.clone(),
    };
    let descriptor = lower_graph(&graph, input.shape(), "in_memory_converted.npy")?;
    Ok(LoweredModule {
        descriptor,
        input: input.clone(),
    })
}

#[test]
fn test_lowered_avg_pool2d_matches_reference_bitwise() -> Result<(), ParityError> {
    let sequence = avg_pool2d_parameter_space();
    for seed in [0, 1, 42] {
        let input = Tensor::new_random_seeded(0., 1., &SMALL_SHAPE, seed);
        let reference = ReferenceExecutor::new().run(&input, &sequence)?;
        let candidate = lowered_module(&sequence, &input)?.test_inference()?;
        assert_eq!(candidate.shape(), &[2, 3, 1, 2]);
        assert_eq!(candidate, reference);
    }
    Ok(())
}

#[test]
fn test_lowered_max_pool2d_matches_reference_bitwise() -> Result<(), ParityError> {
    let sequence = max_pool2d_parameter_space();
    for seed in [0, 7] {
        // 含负数，确保 -∞ 填充不会被误取
        let input = Tensor::new_random_seeded(-1., 1., &SMALL_SHAPE, seed);
        let reference = ReferenceExecutor::new().run(&input, &sequence)?;
        let candidate = lowered_module(&sequence, &input)?.test_inference()?;
        assert_eq!(candidate.shape(), &[2, 3, 2, 1]);
        assert_eq!(candidate, reference);
    }
    Ok(())
}

#[test]
fn test_every_lowered_stage_matches_reference_bitwise() -> Result<(), ParityError> {
    // 逐个算子单独比较，定位问题时更直接
    let input = Tensor::new_random_seeded(0., 1., &[1, 2, 23, 22], 3);
    for op in avg_pool2d_parameter_space().iter() {
        let sequence = OperatorSequence::new(vec![*op])?;
        let reference = ReferenceExecutor::new().run(&input, &sequence)?;
        let candidate = lowered_module(&sequence, &input)?.test_inference()?;
        assert_eq!(candidate, reference, "算子 {op} 不一致");
    }
    Ok(())
}

#[test]
fn test_execute_primitives() -> Result<(), ParityError> {
    let x = Array4::from_shape_vec((1, 1, 2, 2), vec![1., 2., 3., 4.]).unwrap();

    let padded = execute(
        &PrimitiveOp::Pad {
            top: 1,
            bottom: 0,
            left: 0,
            right: 1,
            value: PadValue::NegInfinity,
        },
        x.clone(),
    )?;
    assert_eq!(padded.dim(), (1, 1, 3, 3));
    assert_eq!(padded[[0, 0, 0, 0]], f32::NEG_INFINITY);
    assert_eq!(padded[[0, 0, 2, 1]], 4.);
    assert_eq!(padded[[0, 0, 2, 2]], f32::NEG_INFINITY);

    let window = PrimitiveOp::WindowSum {
        kernel: Pair2d { h: 2, w: 1 },
        stride: Pair2d { h: 1, w: 1 },
    };
    let summed = execute(&window, x.clone())?;
    assert_eq!(summed.into_raw_vec(), vec![4., 6.]);

    let divided = execute(
        &PrimitiveOp::DivideByMap {
            height: 2,
            width: 2,
            divisors: vec![2., 0., 4., 8.],
        },
        x.clone(),
    )?;
    // 除数为 0 的位置输出 0
    assert_eq!(divided.into_raw_vec(), vec![0.5, 0., 0.75, 0.5]);

    let divided = execute(&PrimitiveOp::DivideByScalar { divisor: 3. }, x)?;
    assert_abs_diff_eq!(divided[[0, 0, 1, 1]], 4. / 3., epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_execute_invalid_primitives() {
    let x = Array4::<f32>::zeros((1, 1, 2, 2));
    assert_err!(
        execute(
            &PrimitiveOp::WindowMax {
                kernel: Pair2d { h: 3, w: 1 },
                stride: Pair2d { h: 1, w: 1 },
            },
            x.clone(),
        ),
        ParityError::Load(_)
    );
    assert_err!(
        execute(
            &PrimitiveOp::DivideByMap {
                height: 1,
                width: 2,
                divisors: vec![1., 1.],
            },
            x.clone(),
        ),
        ParityError::Load(_)
    );
    assert_err!(
        execute(&PrimitiveOp::DivideByScalar { divisor: 0. }, x),
        ParityError::Load("DivideByScalar 的除数为 0")
    );
}

#[test]
fn test_converted_executor_on_files() -> Result<(), ParityError> {
    let dir = tempfile::tempdir().unwrap();
    let sequence = avg_pool2d_parameter_space();
    let input = Tensor::new_random_seeded(0., 1., &SMALL_SHAPE, 0);
    let exported = GraphExporter::new().export(&sequence, &input, dir.path(), "test_avg_pool2d")?;
    let (module_path, param_path) = convert_graph_file(&exported.graph_path, &SMALL_SHAPE)?;

    let reference = ReferenceExecutor::new().run(&input, &sequence)?;
    let candidate = ConvertedExecutor::new().run(
        ConversionArtifact::new(module_path.clone(), param_path.clone()),
        &input,
        reference.shape(),
    )?;
    assert_eq!(candidate, reference);

    // 期望形状不一致
    assert_err!(
        ConvertedExecutor::new().run(
            ConversionArtifact::new(module_path.clone(), param_path.clone()),
            &input,
            &[2, 3, 1, 3],
        ),
        ParityError::ShapeMismatch([2, 3, 1, 3], [2, 3, 1, 2], "转换后输出与参考输出形状不一致")
    );

    // 内嵌输入与参考输入不一致
    let other = Tensor::new_random_seeded(0., 1., &SMALL_SHAPE, 1);
    assert_err!(
        ConvertedExecutor::new().run(
            ConversionArtifact::new(module_path, param_path),
            &other,
            reference.shape(),
        ),
        ParityError::Load(_)
    );
    Ok(())
}

#[test]
fn test_load_failures() -> Result<(), ParityError> {
    let dir = tempfile::tempdir().unwrap();
    let module_path = dir.path().join("m_converted.json");
    let param_path = dir.path().join("m_converted.npy");
    let loader = LoweredModuleLoader;

    // 文件不存在
    assert_err!(
        loader.load(&ConversionArtifact::new(module_path.clone(), param_path.clone())),
        ParityError::Load(_)
    );

    // 非法 JSON
    std::fs::write(&module_path, "{ not json").unwrap();
    assert_err!(
        loader.load(&ConversionArtifact::new(module_path.clone(), param_path.clone())),
        ParityError::Load(msg) if msg.starts_with("解析模块失败")
    );

    // 参数文件形状与模块声明不一致
    let input = Tensor::new_random_seeded(0., 1., &SMALL_SHAPE, 0);
    let module = lowered_module(&max_pool2d_parameter_space(), &input)?;
    std::fs::write(&module_path, module.descriptor().to_json().unwrap()).unwrap();
    Tensor::zeros(&[1, 3, 40, 37]).save_npy(&param_path)?;
    assert_err!(
        loader.load(&ConversionArtifact::new(module_path.clone(), param_path.clone())),
        ParityError::Load(msg) if msg.starts_with("内嵌输入形状")
    );

    // 正常加载
    input.save_npy(&param_path)?;
    let loaded = loader.load(&ConversionArtifact::new(module_path, param_path))?;
    assert_eq!(loaded.embedded_input(), &input);
    Ok(())
}
