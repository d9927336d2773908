/*
 * @Date         : 2026-10-17
 * @Description  : 转换后执行器：加载转换产物并在内嵌输入上运行，得到候选输出
 *
 * 加载方式由[`ArtifactLoader`]抽象；[`LoweredModuleLoader`]对应`op_convert`产出的模块
 */

use log::debug;
use ndarray::Ix4;
use std::path::Path;

use crate::conversion::ConversionArtifact;
use crate::conversion::descriptor::{ConvertedModuleDescriptor, FORMAT_VERSION};
use crate::errors::ParityError;
use crate::tensor::Tensor;

mod interpreter;

#[cfg(test)]
mod tests;

/// 已加载、可直接推理的转换后模块
pub trait LoadedModule: std::fmt::Debug {
    /// 模块内嵌的输入
    fn embedded_input(&self) -> &Tensor;

    /// 唯一入口：无参数（参数与输入均已内嵌），返回候选输出
    fn test_inference(&self) -> Result<Tensor, ParityError>;
}

/// 把转换产物加载为[`LoadedModule`]
pub trait ArtifactLoader {
    fn load(&self, artifact: &ConversionArtifact) -> Result<Box<dyn LoadedModule>, ParityError>;
}

/// `op_convert`产物的加载器
#[derive(Debug, Default, Clone, Copy)]
pub struct LoweredModuleLoader;

/// 原语图模块
#[derive(Debug, Clone)]
pub struct LoweredModule {
    descriptor: ConvertedModuleDescriptor,
    input: Tensor,
}

impl LoweredModule {
    /// 从模块 JSON 与参数文件加载
    pub fn load(module_path: &Path, param_path: &Path) -> Result<Self, ParityError> {
        let json = std::fs::read_to_string(module_path).map_err(|e| {
            ParityError::Load(format!("读取模块{}失败: {e}", module_path.display()))
        })?;
        let descriptor = ConvertedModuleDescriptor::from_json(&json)
            .map_err(|e| ParityError::Load(format!("解析模块失败: {e}")))?;
        if descriptor.format_version != FORMAT_VERSION {
            return Err(ParityError::Load(format!(
                "不支持的模块格式版本{}（当前为{FORMAT_VERSION}）",
                descriptor.format_version
            )));
        }

        let input = Tensor::load_npy(param_path)
            .map_err(|e| ParityError::Load(format!("读取参数文件失败: {e}")))?;
        if input.shape() != descriptor.input_shape.as_slice() {
            return Err(ParityError::Load(format!(
                "内嵌输入形状{:?}与模块声明的{:?}不一致",
                input.shape(),
                descriptor.input_shape
            )));
        }
        if input.dimension() != 4 {
            return Err(ParityError::Load(format!(
                "模块输入必须是 4D [N, C, H, W]，得到 {:?}",
                input.shape()
            )));
        }
        Ok(Self { descriptor, input })
    }

    pub fn descriptor(&self) -> &ConvertedModuleDescriptor {
        &self.descriptor
    }
}

impl LoadedModule for LoweredModule {
    fn embedded_input(&self) -> &Tensor {
        &self.input
    }

    fn test_inference(&self) -> Result<Tensor, ParityError> {
        let mut x = self
            .input
            .view()
            .into_dimensionality::<Ix4>()
            .map_err(|e| ParityError::Load(format!("内嵌输入不是 4D: {e}")))?
            .to_owned();

        for (index, stage) in self.descriptor.stages.iter().enumerate() {
            for op in &stage.ops {
                x = interpreter::execute(op, x)?;
            }
            if x.shape() != stage.output_shape.as_slice() {
                return Err(ParityError::Load(format!(
                    "第{index}段（{}）输出形状{:?}与模块声明的{:?}不一致",
                    stage.source_op,
                    x.shape(),
                    stage.output_shape
                )));
            }
            debug!("转换后执行 第{index}段 {} → {:?}", stage.source_op, x.shape());
        }
        Ok(Tensor::from_array(x.into_dyn()))
    }
}

impl ArtifactLoader for LoweredModuleLoader {
    fn load(&self, artifact: &ConversionArtifact) -> Result<Box<dyn LoadedModule>, ParityError> {
        let module = LoweredModule::load(artifact.module_path(), artifact.param_path())?;
        Ok(Box::new(module))
    }
}

/// 转换后执行器
#[derive(Debug, Default, Clone)]
pub struct ConvertedExecutor<L = LoweredModuleLoader> {
    loader: L,
}

impl ConvertedExecutor<LoweredModuleLoader> {
    pub const fn new() -> Self {
        Self {
            loader: LoweredModuleLoader,
        }
    }
}

impl<L: ArtifactLoader> ConvertedExecutor<L> {
    pub const fn with_loader(loader: L) -> Self {
        Self { loader }
    }

    /// 消费转换产物，在与参考执行器相同的输入上运行，得到候选输出。
    /// 候选输出形状与`expected_shape`不一致时报形状不匹配（先于数值比较）
    pub fn run(
        &self,
        artifact: ConversionArtifact,
        input: &Tensor,
        expected_shape: &[usize],
    ) -> Result<Tensor, ParityError> {
        let module = self.loader.load(&artifact)?;
        drop(artifact);

        if module.embedded_input() != input {
            return Err(ParityError::Load(
                "转换产物内嵌的输入与参考执行器的输入不一致".to_string(),
            ));
        }

        let candidate = module.test_inference()?;
        if candidate.shape() != expected_shape {
            return Err(ParityError::ShapeMismatch {
                expected: expected_shape.to_vec(),
                got: candidate.shape().to_vec(),
                message: "转换后输出与参考输出形状不一致".to_string(),
            });
        }
        Ok(candidate)
    }
}
