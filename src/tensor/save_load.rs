use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{read_npy, write_npy};

use super::Tensor;
use crate::errors::TensorError;

// 保存和加载张量（`.npy`格式，便于外部转换工具直接读取）
impl Tensor {
    /// 将单个Tensor写入本地`.npy`文件
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), TensorError> {
        let path = path.as_ref();
        write_npy(path, &self.data)
            .map_err(|e| TensorError::FileIo(format!("写入{}失败: {e}", path.display())))
    }

    /// 从本地`.npy`文件加载单个Tensor
    pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<Self, TensorError> {
        let path = path.as_ref();
        let data: ArrayD<f32> = read_npy(path)
            .map_err(|e| TensorError::FileIo(format!("读取{}失败: {e}", path.display())))?;
        Ok(Self::from_array(data))
    }
}
