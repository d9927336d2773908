/*
 * @Date         : 2026-10-17
 * @Description  : 转换产物与单次运行的工作目录
 */

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::ParityError;

/// 转换产物：转换后模块及其参数文件。每次运行创建一次，由转换后执行器按值消费
#[derive(Debug, PartialEq, Eq)]
pub struct ConversionArtifact {
    module_path: PathBuf,
    param_path: PathBuf,
}

impl ConversionArtifact {
    pub fn new(module_path: PathBuf, param_path: PathBuf) -> Self {
        Self {
            module_path,
            param_path,
        }
    }

    /// `<stem>_converted.json`
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// `<stem>_converted.npy`
    pub fn param_path(&self) -> &Path {
        &self.param_path
    }
}

/// 单次运行的工作目录。临时目录在离开作用域时（包括出错返回）自动删除
#[derive(Debug)]
pub enum WorkDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl WorkDir {
    pub fn temporary() -> Result<Self, ParityError> {
        tempfile::Builder::new()
            .prefix("op_parity_")
            .tempdir()
            .map(Self::Temp)
            .map_err(|e| ParityError::Conversion(format!("无法创建临时工作目录: {e}")))
    }

    /// 使用指定目录（不会被删除）
    pub fn kept<P: Into<PathBuf>>(path: P) -> Result<Self, ParityError> {
        let path = path.into();
        std::fs::create_dir_all(&path).map_err(|e| {
            ParityError::Conversion(format!("无法创建工作目录{}: {e}", path.display()))
        })?;
        Ok(Self::Kept(path))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Kept(path) => path,
        }
    }

    /// 放弃自动清理，返回目录路径
    pub fn keep(self) -> PathBuf {
        match self {
            Self::Temp(dir) => dir.keep(),
            Self::Kept(path) => path,
        }
    }
}
