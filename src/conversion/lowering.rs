/*
 * @Date         : 2026-10-17
 * @Description  : 参考转换工具（op_convert）的核心：导出图 → 转换后模块
 *
 * 职责：
 * - 解析并校验`inputshape=[d0,...,dn]`参数（可带`f32`元素类型后缀）
 * - 校验声明形状与导出图一致
 * - 将每个算子降级为原语段，并把平均池化的除数常量折叠成除数表
 * - 产出`<stem>_converted.json`（模块）与`<stem>_converted.npy`（内嵌输入）
 */

use log::info;
use std::path::{Path, PathBuf};

use super::descriptor::{
    ConvertedModuleDescriptor, ExportedGraph, FORMAT_VERSION, LoweredStage, converted_paths,
};
use crate::errors::ParityError;
use crate::operator::OperatorSemantics;
use crate::tensor::Tensor;

const INPUT_SHAPE_KEY: &str = "inputshape=";

/// 解析`inputshape=[1,12,128,127]`（或带`f32`后缀）
pub fn parse_input_shape(arg: &str) -> Result<Vec<usize>, ParityError> {
    let invalid = || ParityError::Conversion(format!("无法解析输入形状参数`{arg}`"));

    let rest = arg.strip_prefix(INPUT_SHAPE_KEY).ok_or_else(invalid)?;
    let rest = rest.strip_suffix("f32").unwrap_or(rest);
    let body = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(invalid)?;
    if body.trim().is_empty() {
        return Err(invalid());
    }

    let shape = body
        .split(',')
        .map(|d| d.trim().parse::<usize>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    if shape.contains(&0) {
        return Err(ParityError::Conversion(format!(
            "输入形状{shape:?}中的每一维都须为正数"
        )));
    }
    Ok(shape)
}

/// 与[`parse_input_shape`]互逆
pub fn format_input_shape(shape: &[usize]) -> String {
    let dims = shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{INPUT_SHAPE_KEY}[{dims}]")
}

/// 把导出图降级为转换后模块描述
pub fn lower_graph(
    graph: &ExportedGraph,
    declared_shape: &[usize],
    param_file: &str,
) -> Result<ConvertedModuleDescriptor, ParityError> {
    if graph.format_version != FORMAT_VERSION {
        return Err(ParityError::Conversion(format!(
            "不支持的图格式版本{}（当前为{FORMAT_VERSION}）",
            graph.format_version
        )));
    }
    if graph.input_shape != declared_shape {
        return Err(ParityError::Conversion(format!(
            "声明的输入形状{declared_shape:?}与导出图的输入形状{:?}不一致",
            graph.input_shape
        )));
    }

    let mut stages = Vec::with_capacity(graph.operators.len());
    let mut current = declared_shape.to_vec();
    for op in &graph.operators {
        let ops = op.lower(&current).map_err(into_conversion_error)?;
        let output_shape = op.output_shape(&current).map_err(into_conversion_error)?;
        stages.push(LoweredStage {
            source_op: op.to_string(),
            output_shape: output_shape.clone(),
            ops,
        });
        current = output_shape;
    }

    Ok(ConvertedModuleDescriptor {
        format_version: FORMAT_VERSION,
        source: graph.name.clone(),
        input_shape: declared_shape.to_vec(),
        output_shape: current,
        param_file: param_file.to_string(),
        stages,
    })
}

/// 转换工具的完整流程：读导出图 → 降级 → 写出模块与内嵌输入。返回 (模块路径, 参数文件路径)
pub fn convert_graph_file(
    graph_path: &Path,
    declared_shape: &[usize],
) -> Result<(PathBuf, PathBuf), ParityError> {
    let json = std::fs::read_to_string(graph_path).map_err(|e| {
        ParityError::Conversion(format!("读取图文件{}失败: {e}", graph_path.display()))
    })?;
    let graph = ExportedGraph::from_json(&json)
        .map_err(|e| ParityError::Conversion(format!("解析图文件失败: {e}")))?;

    let (module_path, param_path) = converted_paths(graph_path)?;
    let param_file = param_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let module = lower_graph(&graph, declared_shape, &param_file)?;

    // 内嵌输入：校验形状后原样写入参数文件
    let input_path = graph_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(&graph.input_file);
    let input = Tensor::load_npy(&input_path)
        .map_err(|e| ParityError::Conversion(format!("读取输入张量失败: {e}")))?;
    if input.shape() != declared_shape {
        return Err(ParityError::Conversion(format!(
            "输入张量形状{:?}与声明的输入形状{declared_shape:?}不一致",
            input.shape()
        )));
    }
    input
        .save_npy(&param_path)
        .map_err(|e| ParityError::Conversion(format!("写入参数文件失败: {e}")))?;

    let json = module
        .to_json()
        .map_err(|e| ParityError::Conversion(format!("序列化转换后模块失败: {e}")))?;
    std::fs::write(&module_path, json)
        .map_err(|e| ParityError::Conversion(format!("写入转换后模块失败: {e}")))?;

    info!(
        "{} → {}（{} 段，输出形状 {:?}）",
        graph_path.display(),
        module_path.display(),
        module.stages.len(),
        module.output_shape
    );
    Ok((module_path, param_path))
}

fn into_conversion_error(e: ParityError) -> ParityError {
    match e {
        ParityError::Configuration(msg) => ParityError::Conversion(msg),
        other => other,
    }
}
