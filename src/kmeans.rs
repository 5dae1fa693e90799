use log::info;
use ndarray::{Array2, ArrayView2};
use opencv::core::{self, Mat, TermCriteria, TermCriteria_Type};
use opencv::prelude::*;

use crate::config::KMeansOptions;
use crate::error::{Error, Result};
use crate::utils;

/// 将描述符聚类为 k 个中心点
pub trait Clusterer {
    fn cluster(&self, data: ArrayView2<f32>, k: usize) -> Result<Array2<f32>>;
}

/// 聚类结果的不平衡度，各簇大小完全一致时为 1
pub fn imbalance_factor(hist: &[usize]) -> f32 {
    let (mut tot, mut uf) = (0.0, 0.0);
    for h in hist {
        let h = *h as f32;
        tot += h;
        uf += h.powf(2.0);
    }
    uf * hist.len() as f32 / tot.powf(2.0)
}

/// 检查数据量是否足够聚类出 k 个中心
pub fn check_cluster_input(data: ArrayView2<f32>, k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::Clustering("中心点数量必须大于 0".to_string()));
    }
    if data.nrows() < k {
        return Err(Error::Clustering(format!(
            "描述符数量 {} 少于中心点数量 {}",
            data.nrows(),
            k
        )));
    }
    Ok(())
}

/// 使用 OpenCV 的 kmeans 聚类，随机初始化中心，多次尝试取最紧凑的结果
#[derive(Debug, Clone)]
pub struct CvKMeans {
    pub max_iter: i32,
    pub epsilon: f64,
    pub attempts: i32,
}

impl From<&KMeansOptions> for CvKMeans {
    fn from(opts: &KMeansOptions) -> Self {
        Self { max_iter: opts.max_iter, epsilon: opts.epsilon, attempts: opts.attempts }
    }
}

impl Default for CvKMeans {
    fn default() -> Self {
        Self::from(&KMeansOptions::default())
    }
}

impl Clusterer for CvKMeans {
    fn cluster(&self, data: ArrayView2<f32>, k: usize) -> Result<Array2<f32>> {
        check_cluster_input(data, k)?;
        info!(
            "对 {} 组 {} 维向量进行聚类，中心点数量 = {}",
            data.nrows(),
            data.ncols(),
            k
        );

        let samples = utils::array_to_mat(data)?;
        let criteria = TermCriteria::new(
            TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
            self.max_iter,
            self.epsilon,
        )?;
        let mut labels = Mat::default();
        let mut centers = Mat::default();
        let compactness = core::kmeans(
            &samples,
            k as i32,
            &mut labels,
            criteria,
            self.attempts,
            core::KMEANS_RANDOM_CENTERS,
            &mut centers,
        )?;

        let mut freq = vec![0usize; k];
        for &label in labels.data_typed::<i32>()? {
            freq[label as usize] += 1;
        }
        info!(
            "聚类完成 - 紧凑度：{:.2} | 不平衡度：{:.2}",
            compactness,
            imbalance_factor(&freq)
        );

        let centers = utils::mat_to_array(&centers, data.ncols())?;
        if centers.nrows() != k {
            let found = centers.nrows();
            return Err(Error::Clustering(format!("期望 {k} 个中心点，实际 {found}")));
        }
        Ok(centers)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;

    fn two_blobs() -> Array2<f32> {
        let mut data = Array2::zeros((40, 2));
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.1;
            data[[i, 0]] = jitter;
            data[[i, 1]] = jitter;
            data[[i + 20, 0]] = 50. + jitter;
            data[[i + 20, 1]] = 50. - jitter;
        }
        data
    }

    #[test]
    fn test_imbalance_factor() {
        assert_eq!(imbalance_factor(&[5, 5, 5, 5]), 1.0);
        assert!(imbalance_factor(&[10, 0]) > 1.9);
    }

    #[test]
    fn kmeans_two_blobs() {
        let data = two_blobs();
        let centers = CvKMeans::default().cluster(data.view(), 2).unwrap();
        assert_eq!(centers.dim(), (2, 2));

        let mut xs: Vec<f32> = centers.column(0).to_vec();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(xs[0] < 1.0);
        assert!(xs[1] > 49.0);
    }

    #[test]
    fn kmeans_exact_k() {
        let data = array![[0f32, 0.], [1., 1.], [2., 2.]];
        let centers = CvKMeans::default().cluster(data.view(), 3).unwrap();
        assert_eq!(centers.nrows(), 3);
    }

    #[test]
    fn kmeans_too_few_samples() {
        let data = array![[0f32, 0.], [1., 1.]];
        let err = CvKMeans::default().cluster(data.view(), 3).unwrap_err();
        assert!(matches!(err, Error::Clustering(_)));
    }

    #[test]
    fn kmeans_zero_k() {
        let data = array![[0f32, 0.]];
        assert!(matches!(CvKMeans::default().cluster(data.view(), 0), Err(Error::Clustering(_))));
    }
}
