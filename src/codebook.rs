use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Error, Result};

/// 图片在视觉词典上的归一化词频直方图
pub type Histogram = Array1<f32>;

/// 视觉词典，每行是一个聚类中心（视觉单词）
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    centroids: Array2<f32>,
}

impl Codebook {
    pub fn new(centroids: Array2<f32>) -> Result<Self> {
        if centroids.nrows() == 0 {
            return Err(Error::Clustering("词典不能为空".to_string()));
        }
        Ok(Self { centroids })
    }

    /// 视觉单词数量
    pub fn size(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn dim(&self) -> usize {
        self.centroids.ncols()
    }

    pub fn centroids(&self) -> ArrayView2<'_, f32> {
        self.centroids.view()
    }

    /// 返回欧氏距离最近的视觉单词下标，距离相同时取下标较小者
    pub fn nearest(&self, feature: ArrayView1<f32>) -> usize {
        let mut best = (0, f32::INFINITY);
        for (i, word) in self.centroids.rows().into_iter().enumerate() {
            let d = squared_l2(feature, word);
            if d < best.1 {
                best = (i, d);
            }
        }
        best.0
    }

    /// 统计每个描述符最近的视觉单词并归一化，使各项之和为 1
    ///
    /// 没有描述符时返回全零直方图。
    pub fn encode(&self, descriptors: ArrayView2<f32>) -> Result<Histogram> {
        if descriptors.ncols() != self.dim() && descriptors.nrows() > 0 {
            let found = descriptors.ncols();
            return Err(Error::DimensionMismatch { expected: self.dim(), found });
        }

        let mut histogram = Array1::<f32>::zeros(self.size());
        for feature in descriptors.rows() {
            histogram[self.nearest(feature)] += 1.;
        }

        let total = descriptors.nrows();
        if total > 0 {
            histogram /= total as f32;
        }
        Ok(histogram)
    }
}

/// 将若干等长向量按行堆叠为矩阵
pub fn stack_rows(rows: &[Histogram], width: usize) -> Result<Array2<f32>> {
    let mut data = Vec::with_capacity(rows.len() * width);
    for row in rows {
        if row.len() != width {
            return Err(Error::DimensionMismatch { expected: width, found: row.len() });
        }
        data.extend(row.iter());
    }
    Ok(Array2::from_shape_vec((rows.len(), width), data).expect("rows have equal length"))
}

#[inline]
fn squared_l2(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
