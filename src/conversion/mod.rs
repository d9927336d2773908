//! # 转换
//!
//! 导出交换格式、以独立进程驱动外部转换工具、收集转换产物；
//! 另含参考转换工具`op_convert`所用的降级逻辑。

mod artifact;
pub mod descriptor;
mod driver;
mod exporter;
pub mod lowering;

pub use self::artifact::{ConversionArtifact, WorkDir};
pub use self::driver::ConversionDriver;
pub use self::exporter::{ExportedFiles, GraphExporter};

#[cfg(test)]
mod tests;
