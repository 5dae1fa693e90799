use log::debug;
use ndarray::ArrayView2;
use opencv::core::{Mat, Ptr, TermCriteria, TermCriteria_Type};
use opencv::ml::{self, SVM};
use opencv::prelude::*;

use crate::classifier::{Model, Trainer, check_training_input};
use crate::config::SvmOptions;
use crate::error::{Error, Result};
use crate::utils;

/// 线性核 C-SVC 训练器
#[derive(Debug, Clone)]
pub struct CvSvm {
    pub c: f64,
    pub gamma: f64,
}

impl From<&SvmOptions> for CvSvm {
    fn from(opts: &SvmOptions) -> Self {
        Self { c: opts.svm_c, gamma: opts.svm_gamma }
    }
}

impl Default for CvSvm {
    fn default() -> Self {
        Self::from(&SvmOptions::default())
    }
}

pub struct SvmModel {
    svm: Ptr<SVM>,
    dim: usize,
}

impl Trainer for CvSvm {
    type Model = SvmModel;

    fn train(&self, features: ArrayView2<f32>, labels: &[i32]) -> Result<SvmModel> {
        check_training_input(features, labels)?;

        let mut svm = SVM::create()?;
        svm.set_type(ml::SVM_Types::C_SVC as i32)?;
        svm.set_kernel(ml::SVM_KernelTypes::LINEAR as i32)?;
        svm.set_c(self.c)?;
        svm.set_gamma(self.gamma)?;
        svm.set_term_criteria(TermCriteria::new(
            TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
            100_000,
            1e-3,
        )?)?;

        let samples = utils::array_to_mat(features)?;
        let responses = utils::labels_to_mat(labels)?;
        debug!("训练 SVM，样本 {} × {}，C = {}", features.nrows(), features.ncols(), self.c);
        if !svm.train(&samples, ml::ROW_SAMPLE, &responses)? {
            return Err(Error::Classifier("SVM 训练失败".to_string()));
        }

        Ok(SvmModel { svm, dim: features.ncols() })
    }
}

impl Model for SvmModel {
    fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<i32>> {
        if features.nrows() == 0 {
            return Ok(vec![]);
        }
        if features.ncols() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, found: features.ncols() });
        }
        let samples = utils::array_to_mat(features)?;
        let mut results = Mat::default();
        self.svm.predict(&samples, &mut results, 0)?;
        Ok(results.data_typed::<f32>()?.iter().map(|&r| r.round() as i32).collect())
    }
}
