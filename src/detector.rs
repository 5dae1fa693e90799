use std::path::Path;

use log::{debug, warn};
use opencv::core::{KeyPoint, Ptr, Vector};
use opencv::features2d::SIFT;
use opencv::prelude::*;
#[cfg(feature = "surf")]
use opencv::xfeatures2d::SURF;

use crate::config::{Detector, DetectorOptions};
use crate::error::{Error, Result};
use crate::extractor::{DescriptorExtractor, Descriptors};
use crate::utils;

enum Backend {
    #[cfg(feature = "surf")]
    Surf(Ptr<SURF>),
    Sift(Ptr<SIFT>),
}

/// 基于 OpenCV 的描述符提取器
pub struct FeatureDetector {
    backend: Backend,
    dim: usize,
}

impl FeatureDetector {
    pub fn create(opts: &DetectorOptions) -> Result<Self> {
        match opts.detector {
            Detector::Surf => Self::surf(opts.hessian_threshold, opts.extended),
            Detector::Sift => {
                if opts.extended {
                    warn!("SIFT 描述符固定为 128 维，忽略 --extended");
                }
                Self::sift()
            }
        }
    }

    #[cfg(feature = "surf")]
    pub fn surf(hessian_threshold: f64, extended: bool) -> Result<Self> {
        let surf = SURF::create(hessian_threshold, 4, 3, extended, false).map_err(|e| {
            Error::Detector(format!("{e}，OpenCV 可能未启用 nonfree 模块，可尝试 --detector sift"))
        })?;
        debug!("创建 SURF 检测器，hessian_threshold = {hessian_threshold}, extended = {extended}");
        Ok(Self { backend: Backend::Surf(surf), dim: if extended { 128 } else { 64 } })
    }

    #[cfg(not(feature = "surf"))]
    pub fn surf(_hessian_threshold: f64, _extended: bool) -> Result<Self> {
        Err(Error::Detector("编译时未启用 surf 特性，可尝试 --detector sift".to_string()))
    }

    pub fn sift() -> Result<Self> {
        let sift = SIFT::create_def().map_err(|e| Error::Detector(e.to_string()))?;
        debug!("创建 SIFT 检测器");
        Ok(Self { backend: Backend::Sift(sift), dim: 128 })
    }

    pub fn detect_and_compute(&mut self, image: &Mat) -> Result<(Vector<KeyPoint>, Mat)> {
        let mask = Mat::default();
        let mut kps = Vector::<KeyPoint>::new();
        let mut des = Mat::default();
        match &mut self.backend {
            #[cfg(feature = "surf")]
            Backend::Surf(surf) => {
                surf.detect_and_compute(image, &mask, &mut kps, &mut des, false)?
            }
            Backend::Sift(sift) => {
                sift.detect_and_compute(image, &mask, &mut kps, &mut des, false)?
            }
        }
        Ok((kps, des))
    }

    /// 读取图片并计算关键点和描述符
    pub fn detect_file(&mut self, path: &Path) -> Result<(Mat, Vector<KeyPoint>, Descriptors)> {
        let image = utils::imread(path)?;
        let (kps, des) = self.detect_and_compute(&image)?;
        let des = utils::mat_to_array(&des, self.dim)?;
        if des.ncols() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, found: des.ncols() });
        }
        Ok((image, kps, des))
    }

    /// 在图片上绘制关键点并保存到 `output`，返回关键点数量
    pub fn show_keypoints(&mut self, image: &Path, output: &Path) -> Result<usize> {
        let (image, kps, _) = self.detect_file(image)?;
        let drawn = utils::draw_keypoints(&image, &kps)?;
        utils::imwrite(output, &drawn)?;
        Ok(kps.len())
    }
}

impl DescriptorExtractor for FeatureDetector {
    fn dim(&self) -> usize {
        self.dim
    }

    fn extract(&mut self, path: &Path) -> Result<Descriptors> {
        let (_, _, des) = self.detect_file(path)?;
        if des.nrows() == 0 {
            debug!("未检测到关键点: {}", path.display());
        }
        Ok(des)
    }
}
