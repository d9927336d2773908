use std::path::PathBuf;

use crate::assert_err;
use crate::errors::ParityError;
use crate::harness::{EXIT_FAIL, EXIT_PASS, Harness, HarnessConfig, HarnessReport, exit_code};
use crate::operator::param_space::{avg_pool2d_parameter_space, max_pool2d_parameter_space};
use crate::operator::{MaxPool2dConfig, Operator, OperatorFamily, OperatorSequence};
use crate::oracle::{ComparisonPolicy, Verdict};

#[test]
fn test_config_defaults() {
    let config = HarnessConfig::default();
    assert_eq!(config.name, "test_avg_pool2d");
    assert_eq!(config.family, OperatorFamily::AvgPool2d);
    assert_eq!(config.seed, 0);
    assert_eq!(config.input_shape, vec![1, 12, 128, 127]);
    assert_eq!(config.converter, PathBuf::from("op_convert"));
    assert_eq!(config.policy, ComparisonPolicy::Exact);
    assert_eq!(config.timeout_secs, None);
    assert!(!config.keep_artifacts);
    assert_eq!(config.sequence(), avg_pool2d_parameter_space());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_json() -> Result<(), ParityError> {
    let config = HarnessConfig::from_json(
        r#"{
            "name": "test_max_pool2d",
            "family": "max_pool2d",
            "seed": 3,
            "policy": {"mode": "tolerance", "abs": 1e-6, "rel": 0.0},
            "timeout_secs": 30
        }"#,
    )?;
    assert_eq!(config.family, OperatorFamily::MaxPool2d);
    assert_eq!(config.seed, 3);
    assert_eq!(config.timeout_secs, Some(30));
    assert_eq!(config.input_shape, vec![1, 12, 128, 127]);
    assert_eq!(config.sequence(), max_pool2d_parameter_space());

    // 显式序列优先于算子族
    let config = HarnessConfig::from_json(
        r#"{"sequence": [{"type": "MaxPool2d", "kernel_size": 2}]}"#,
    )?;
    assert_eq!(
        config.sequence(),
        OperatorSequence::new(vec![Operator::from(MaxPool2dConfig::new(2))])?
    );
    Ok(())
}

#[test]
fn test_config_from_invalid_json() {
    assert_err!(
        HarnessConfig::from_json(r#"{"unknown_field": 1}"#),
        ParityError::Configuration(_)
    );
    // 序列中的非法参数在解析配置时即被发现
    assert_err!(
        HarnessConfig::from_json(r#"{"sequence": [{"type": "AvgPool2d", "kernel_size": 3, "padding": 2}]}"#),
        ParityError::Configuration(_)
    );
    assert_err!(
        HarnessConfig::from_json_file("/nonexistent/op_parity.json"),
        ParityError::Configuration(_)
    );
}

#[test]
fn test_config_validate() {
    let config = HarnessConfig {
        input_shape: vec![12, 128, 127],
        ..HarnessConfig::default()
    };
    assert_err!(config.validate(), ParityError::Configuration(_));

    let config = HarnessConfig {
        policy: ComparisonPolicy::Tolerance { abs: -1., rel: 0. },
        ..HarnessConfig::default()
    };
    assert_err!(config.validate(), ParityError::Configuration(_));

    let config = HarnessConfig {
        timeout_secs: Some(0),
        ..HarnessConfig::default()
    };
    assert_err!(config.validate(), ParityError::Configuration(_));
}

#[test]
fn test_make_input_is_seeded() {
    let config = HarnessConfig {
        input_shape: vec![1, 2, 8, 8],
        ..HarnessConfig::default()
    };
    let a = Harness::new(config.clone()).make_input();
    let b = Harness::new(config).make_input();
    assert_eq!(a, b);
    assert_eq!(a.shape(), &[1, 2, 8, 8]);
}

#[test]
fn test_run_with_unreachable_converter() {
    let dir = tempfile::tempdir().unwrap();
    let work_dir = dir.path().join("work");
    let config = HarnessConfig {
        input_shape: vec![1, 2, 40, 37],
        converter: dir.path().join("no_such_converter"),
        work_dir: Some(work_dir.clone()),
        ..HarnessConfig::default()
    };

    let result = Harness::new(config).run();
    assert_err!(result, ParityError::Conversion(_));
    assert_eq!(exit_code(&result), EXIT_FAIL);
    // 指定的工作目录保留了导出的图，便于排查
    assert!(work_dir.join("test_avg_pool2d.json").is_file());
    assert!(work_dir.join("test_avg_pool2d.input.npy").is_file());
}

#[test]
fn test_run_with_invalid_config() {
    let config = HarnessConfig {
        input_shape: vec![1, 2, 8, 8],
        ..HarnessConfig::default()
    };
    // 参数空间在 8x8 上无法执行，在调用转换工具前就失败
    let result = Harness::new(config).run();
    assert_err!(result, ParityError::Configuration(_));
    assert_eq!(exit_code(&result), EXIT_FAIL);
}

#[test]
fn test_exit_code() {
    let report = HarnessReport {
        name: "test_avg_pool2d".to_string(),
        operator_count: 8,
        output_shape: vec![1, 12, 4, 6],
        verdict: Verdict {
            passed: true,
            diagnostic: None,
        },
        artifacts_dir: None,
    };
    assert_eq!(exit_code(&Ok(report)), EXIT_PASS);
    assert_eq!(
        exit_code(&Err(ParityError::Load("x".to_string()))),
        EXIT_FAIL
    );
}
