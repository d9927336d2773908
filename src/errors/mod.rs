use thiserror::Error;
mod parity;
pub use self::parity::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("随机区间须满足 min < max，得到 [{min}, {max})")]
    InvalidRange { min: f32, max: f32 },
    #[error("数据长度为{data_len}，与形状{shape:?}所需的{expected}个元素不一致")]
    DataShapeMismatch {
        data_len: usize,
        shape: Vec<usize>,
        expected: usize,
    },
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("张量文件读写失败：{0}")]
    FileIo(String),
}
