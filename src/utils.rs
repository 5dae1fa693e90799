use std::path::Path;

use indicatif::ProgressStyle;
use ndarray::{Array2, ArrayView2};
use opencv::core::{self, KeyPoint, Vector};
use opencv::features2d;
use opencv::imgcodecs;
use opencv::prelude::*;

use crate::error::{Error, Result};

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>6}/{len:6} {msg}")
        .expect("progress template is valid")
        .progress_chars("##-")
}

/// 以灰度模式读取图片，读取失败或图片为空时返回错误
pub fn imread(path: &Path) -> Result<Mat> {
    let filename = path
        .to_str()
        .ok_or_else(|| Error::extraction(path, "路径不是合法的 UTF-8"))?;
    let image = imgcodecs::imread(filename, imgcodecs::IMREAD_GRAYSCALE)?;
    if image.rows() == 0 || image.cols() == 0 {
        return Err(Error::extraction(path, "无法读取图片"));
    }
    Ok(image)
}

pub fn imwrite(path: &Path, image: &impl core::ToInputArray) -> Result<()> {
    let output_error = |reason: String| Error::Output { path: path.to_path_buf(), reason };
    let filename = path.to_str().ok_or_else(|| output_error("路径不是合法的 UTF-8".into()))?;
    let flags = Vector::<i32>::new();
    match imgcodecs::imwrite(filename, image, &flags) {
        Ok(true) => {}
        Ok(false) => return Err(output_error("编码器返回失败".into())),
        Err(e) => return Err(output_error(e.message)),
    }
    Ok(())
}

pub fn draw_keypoints(
    image: &impl core::ToInputArray,
    keypoints: &Vector<KeyPoint>,
) -> Result<Mat> {
    let mut output = Mat::default();
    features2d::draw_keypoints(
        image,
        keypoints,
        &mut output,
        core::Scalar::all(-1.0),
        features2d::DrawMatchesFlags::DRAW_RICH_KEYPOINTS,
    )?;
    Ok(output)
}

/// 将 CV_32F 的 Mat 复制为 ndarray 矩阵
///
/// 空 Mat 会得到 `0 × width` 的矩阵。
pub fn mat_to_array(mat: &Mat, width: usize) -> Result<Array2<f32>> {
    if mat.rows() == 0 {
        return Ok(Array2::zeros((0, width)));
    }
    let (rows, cols) = (mat.rows() as usize, mat.cols() as usize);
    let data = if mat.is_continuous() {
        mat.data_typed::<f32>()?.to_vec()
    } else {
        mat.try_clone()?.data_typed::<f32>()?.to_vec()
    };
    Ok(Array2::from_shape_vec((rows, cols), data).expect("mat shape matches its buffer"))
}

/// 将 ndarray 矩阵复制为 CV_32F 的 Mat
pub fn array_to_mat(array: ArrayView2<f32>) -> Result<Mat> {
    let (rows, cols) = array.dim();
    let data = array.as_standard_layout();
    let slice = data.as_slice().expect("standard layout is contiguous");
    let mat = Mat::new_rows_cols_with_data(rows as i32, cols as i32, slice)?;
    Ok(mat.try_clone()?)
}

/// 将标签复制为 `n × 1` 的 CV_32S Mat
pub fn labels_to_mat(labels: &[i32]) -> Result<Mat> {
    let mat = Mat::new_rows_cols_with_data(labels.len() as i32, 1, labels)?;
    Ok(mat.try_clone()?)
}
