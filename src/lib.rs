//! # Op Parity
//!
//! `op_parity`校验一个模型转换工具是否保持了池化算子（`avg_pool2d`、`max_pool2d`）的数值语义：
//! 用固定种子生成输入，分别经参考实现与“导出 → 外部转换 → 转换后执行”两条路径计算，
//! 再逐元素比较两者的输出。一致时退出码为 0，任何阶段失败或结果不一致时为 1。
//!

pub mod conversion;
pub mod converted;
pub mod errors;
pub mod harness;
pub mod operator;
pub mod oracle;
pub mod reference;
pub mod tensor;
pub mod utils;
