/*
 * @Date         : 2026-10-17
 * @Description  : 转换失败路径：转换工具不可用、非零退出、命令行退出码
 */
use std::process::Command;

use op_parity::conversion::{ConversionDriver, GraphExporter};
use op_parity::errors::ParityError;
use op_parity::harness::{EXIT_FAIL, Harness, HarnessConfig, exit_code};
use op_parity::operator::{OperatorFamily, parameter_space};
use op_parity::tensor::Tensor;

#[test]
fn test_unreachable_converter_fails_run() {
    let config = HarnessConfig {
        converter: "op_convert_that_does_not_exist".into(),
        input_shape: vec![1, 2, 40, 37],
        ..HarnessConfig::default()
    };
    let result = Harness::new(config).run();
    assert!(
        matches!(result, Err(ParityError::Conversion(_))),
        "{result:?}"
    );
    assert_eq!(exit_code(&result), EXIT_FAIL);
}

#[test]
fn test_converter_non_zero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let input = Tensor::new_random_seeded(0., 1., &[1, 2, 40, 37], 0);
    let mut exported = GraphExporter::new()
        .export(
            &parameter_space(OperatorFamily::AvgPool2d),
            &input,
            dir.path(),
            "test_avg_pool2d",
        )
        .unwrap();
    // 声明的形状与导出图不一致，op_convert 以非零状态退出
    exported.input_shape = vec![1, 2, 40, 38];

    let result = ConversionDriver::new(env!("CARGO_BIN_EXE_op_convert")).convert(&exported);
    match result {
        Err(ParityError::Conversion(msg)) => {
            assert!(msg.contains("非零状态"), "{msg}");
            // 转换工具的日志被附在错误信息里
            assert!(msg.contains("[1, 2, 40, 38]"), "{msg}");
        }
        other => panic!("预期转换错误，实际得到 {other:?}"),
    }
    assert!(!dir.path().join("test_avg_pool2d_converted.json").exists());
}

#[cfg(unix)]
#[test]
fn test_reused_work_dir_does_not_accept_stale_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = HarnessConfig {
        converter: env!("CARGO_BIN_EXE_op_convert").into(),
        input_shape: vec![1, 2, 40, 37],
        work_dir: Some(dir.path().to_path_buf()),
        ..HarnessConfig::default()
    };
    Harness::new(config.clone()).run().unwrap();
    assert!(dir.path().join("test_avg_pool2d_converted.json").is_file());

    // 第二次运行的转换工具什么也不写却成功退出
    let rerun = HarnessConfig {
        converter: "true".into(),
        ..config
    };
    let result = Harness::new(rerun).run();
    assert!(
        matches!(&result, Err(ParityError::Conversion(msg)) if msg.contains("未产出")),
        "{result:?}"
    );
    assert_eq!(exit_code(&result), EXIT_FAIL);
}

#[test]
fn test_op_convert_usage_errors() {
    let output = Command::new(env!("CARGO_BIN_EXE_op_convert"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let output = Command::new(env!("CARGO_BIN_EXE_op_convert"))
        .arg("missing.json")
        .arg("inputshape=[1,12,128,127]")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_exit_codes() {
    let output = Command::new(env!("CARGO_BIN_EXE_op_parity"))
        .args(["--family", "max_pool2d", "--input-shape", "1,2,40,37"])
        .args(["--converter", env!("CARGO_BIN_EXE_op_convert")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("PASS test_max_pool2d"));

    let output = Command::new(env!("CARGO_BIN_EXE_op_parity"))
        .args(["--input-shape", "1,2,40,37"])
        .args(["--converter", "op_convert_that_does_not_exist"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAIL conversion"));
}
