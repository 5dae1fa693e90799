use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// 数据集目录结构不符合约定
    #[error("数据集目录结构错误: {0}")]
    DatasetLayout(String),
    /// 图片无法读取或解码
    #[error("特征提取失败 {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },
    /// 特征检测器无法创建
    #[error("无法创建特征检测器: {0}")]
    Detector(String),
    /// 结果图片无法写入
    #[error("无法写入图片 {}: {reason}", .path.display())]
    Output { path: PathBuf, reason: String },
    #[error("聚类失败: {0}")]
    Clustering(String),
    #[error("分类器错误: {0}")]
    Classifier(String),
    #[error("描述符维度不匹配: 期望 {expected}，实际 {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("目录遍历错误: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("OpenCV 错误: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    pub fn extraction(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Extraction { path: path.into(), reason: reason.into() }
    }
}
