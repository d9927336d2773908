/*
 * @Date         : 2026-10-17
 * @Description  : 导出：把算子序列与输入张量写成`<name>.json` + `<name>.input.npy`
 */

use log::debug;
use std::path::{Path, PathBuf};

use super::descriptor::{ExportedGraph, FORMAT_VERSION};
use crate::errors::ParityError;
use crate::operator::OperatorSequence;
use crate::tensor::Tensor;

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// `<name>.json`
    pub graph_path: PathBuf,
    /// `<name>.input.npy`
    pub input_path: PathBuf,
    pub input_shape: Vec<usize>,
}

/// 把算子序列与输入张量写成外部转换工具读取的交换格式
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphExporter;

impl GraphExporter {
    pub const fn new() -> Self {
        Self
    }

    /// 自动生成两个文件：
    /// - `{dir}/{name}.json`: 图描述（可读）
    /// - `{dir}/{name}.input.npy`: 输入张量
    pub fn export(
        &self,
        sequence: &OperatorSequence,
        input: &Tensor,
        dir: &Path,
        name: &str,
    ) -> Result<ExportedFiles, ParityError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ParityError::Configuration(format!(
                "图名称`{name}`不能为空或包含路径分隔符"
            )));
        }
        // 导出前确认整条序列在声明的输入形状下合法
        sequence.infer_shapes(input.shape())?;

        let graph_path = dir.join(format!("{name}.json"));
        let input_file = format!("{name}.input.npy");
        let input_path = dir.join(&input_file);

        // 1. 保存输入张量
        input
            .save_npy(&input_path)
            .map_err(|e| ParityError::Conversion(format!("导出输入张量失败: {e}")))?;

        // 2. 保存图描述
        let graph = ExportedGraph {
            format_version: FORMAT_VERSION,
            name: name.to_string(),
            input_shape: input.shape().to_vec(),
            input_file,
            operators: sequence.clone(),
        };
        let json = graph
            .to_json()
            .map_err(|e| ParityError::Conversion(format!("序列化图描述失败: {e}")))?;
        std::fs::write(&graph_path, json)
            .map_err(|e| ParityError::Conversion(format!("写入图文件失败: {e}")))?;

        debug!(
            "已导出 {}（{} 个算子，输入形状 {:?}）",
            graph_path.display(),
            sequence.len(),
            input.shape()
        );
        Ok(ExportedFiles {
            graph_path,
            input_path,
            input_shape: input.shape().to_vec(),
        })
    }
}
