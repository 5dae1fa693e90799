use std::path::Path;

use ndarray::Array2;

use crate::error::Result;

/// 单张图片的局部描述符，每行一个关键点
pub type Descriptors = Array2<f32>;

/// 从图片中提取局部描述符
///
/// 图片中没有检测到关键点时应返回零行的描述符矩阵，而不是错误。
pub trait DescriptorExtractor {
    /// 描述符维度
    fn dim(&self) -> usize;

    fn extract(&mut self, path: &Path) -> Result<Descriptors>;
}
