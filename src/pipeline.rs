use std::fmt;
use std::path::Path;

use indicatif::{ProgressBar, ProgressIterator};
use log::info;
use ndarray::Array2;
use serde::Serialize;

use crate::classifier::{Accuracy, Model, Trainer};
use crate::codebook::{Codebook, Histogram, stack_rows};
use crate::dataset::{Dataset, LabelMap, Sample};
use crate::dictionary::build_dictionary;
use crate::error::Result;
use crate::extractor::DescriptorExtractor;
use crate::kmeans::Clusterer;
use crate::utils::pb_style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scan,
    BuildDictionary,
    Train,
    Test,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scan => "扫描数据集",
            Stage::BuildDictionary => "构建词典",
            Stage::Train => "训练",
            Stage::Test => "测试",
            Stage::Done => "完成",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// 词典形状：(单词数量, 描述符维度)
    pub dictionary: (usize, usize),
    pub train: Accuracy,
    pub test: Accuracy,
}

/// 扫描 → 词典构建 → 训练 → 测试 的完整流程
///
/// 描述符提取、聚类和分类器都由外部实现提供。
pub struct Pipeline<E, C, T> {
    extractor: E,
    clusterer: C,
    trainer: T,
    dictionary_size: usize,
    stage: Stage,
}

impl<E, C, T> Pipeline<E, C, T>
where
    E: DescriptorExtractor,
    C: Clusterer,
    T: Trainer,
{
    pub fn new(extractor: E, clusterer: C, trainer: T, dictionary_size: usize) -> Self {
        Self { extractor, clusterer, trainer, dictionary_size, stage: Stage::Scan }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        info!("{} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// 扫描 `root` 下的数据集并依次完成词典构建、训练和测试
    pub fn run(&mut self, root: &Path, suffix: &str, labels: &LabelMap) -> Result<Report> {
        let dataset = self.scan(root, suffix, labels)?;
        self.evaluate(&dataset)
    }

    pub fn scan(&mut self, root: &Path, suffix: &str, labels: &LabelMap) -> Result<Dataset> {
        self.stage = Stage::Scan;
        Dataset::scan(root, suffix, labels)
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<Report> {
        self.enter(Stage::BuildDictionary);
        let codebook = self.build_dictionary(dataset)?;
        info!("词典构建完成 {:?}", codebook.centroids().dim());

        self.enter(Stage::Train);
        let (model, train) = self.train(&codebook, &dataset.training)?;
        info!("训练集正确率: {train}");

        self.enter(Stage::Test);
        let test = self.test(&codebook, &model, &dataset.testing)?;
        info!("测试集正确率: {test}");

        self.enter(Stage::Done);
        Ok(Report { dictionary: codebook.centroids().dim(), train, test })
    }

    pub fn build_dictionary(&mut self, dataset: &Dataset) -> Result<Codebook> {
        build_dictionary(
            &dataset.dictionary,
            self.dictionary_size,
            &mut self.extractor,
            &self.clusterer,
        )
    }

    /// 训练分类器，并返回模型在训练集上的正确率
    pub fn train(
        &mut self,
        codebook: &Codebook,
        samples: &[Sample],
    ) -> Result<(T::Model, Accuracy)> {
        let (features, labels) = self.histograms(codebook, samples)?;
        let model = self.trainer.train(features.view(), &labels)?;
        let predicted = model.predict(features.view())?;
        Ok((model, Accuracy::new(&predicted, &labels)))
    }

    pub fn test(
        &mut self,
        codebook: &Codebook,
        model: &T::Model,
        samples: &[Sample],
    ) -> Result<Accuracy> {
        let (features, labels) = self.histograms(codebook, samples)?;
        let predicted = model.predict(features.view())?;
        Ok(Accuracy::new(&predicted, &labels))
    }

    pub fn histogram(&mut self, codebook: &Codebook, path: &Path) -> Result<Histogram> {
        let des = self.extractor.extract(path)?;
        codebook.encode(des.view())
    }

    fn histograms(
        &mut self,
        codebook: &Codebook,
        samples: &[Sample],
    ) -> Result<(Array2<f32>, Vec<i32>)> {
        let pb = ProgressBar::new(samples.len() as u64).with_style(pb_style());
        let mut rows = Vec::with_capacity(samples.len());
        for sample in samples.iter().progress_with(pb.clone()) {
            rows.push(self.histogram(codebook, &sample.path)?);
        }
        pb.finish_and_clear();

        let labels = samples.iter().map(|s| s.label as i32).collect();
        Ok((stack_rows(&rows, codebook.size())?, labels))
    }
}
