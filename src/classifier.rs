use std::fmt;

use ndarray::ArrayView2;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{Error, Result};

/// 训练好的分类模型
pub trait Model {
    /// 对每一行特征给出预测标签
    fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<i32>>;
}

/// 分类器训练器
pub trait Trainer {
    type Model: Model;

    fn train(&self, features: ArrayView2<f32>, labels: &[i32]) -> Result<Self::Model>;
}

/// 训练前检查样本与标签
pub fn check_training_input(features: ArrayView2<f32>, labels: &[i32]) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(Error::Classifier(format!(
            "样本数量 {} 与标签数量 {} 不一致",
            features.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(Error::Classifier("没有训练样本".to_string()));
    }
    if labels.iter().all(|&l| l == labels[0]) {
        return Err(Error::Classifier("训练样本至少需要两个类别".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    pub fn new(predicted: &[i32], truth: &[i32]) -> Self {
        let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
        Self { correct, total: truth.len() }
    }

    /// 正确率，范围 [0, 1]，没有样本时为 0
    pub fn ratio(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.correct as f64 / self.total as f64 }
    }
}

impl Serialize for Accuracy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Accuracy", 3)?;
        s.serialize_field("correct", &self.correct)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("ratio", &self.ratio())?;
        s.end()
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% ({}/{})", self.ratio() * 100., self.correct, self.total)
    }
}
