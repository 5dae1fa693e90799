use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressIterator};
use log::{info, warn};

use crate::codebook::Codebook;
use crate::error::Result;
use crate::extractor::DescriptorExtractor;
use crate::kmeans::{Clusterer, check_cluster_input};
use crate::matrix::DescriptorPool;
use crate::utils::pb_style;

/// 从字典集图片中提取描述符并聚类，生成大小为 `size` 的视觉词典
///
/// 描述符池在返回前释放，不会留到后续的训练阶段。
pub fn build_dictionary<E, C>(
    paths: &[PathBuf],
    size: usize,
    extractor: &mut E,
    clusterer: &C,
) -> Result<Codebook>
where
    E: DescriptorExtractor + ?Sized,
    C: Clusterer + ?Sized,
{
    let mut pool = DescriptorPool::new(extractor.dim());
    let mut empty = 0;

    let pb = ProgressBar::new(paths.len() as u64).with_style(pb_style());
    for path in paths.iter().progress_with(pb.clone()) {
        let des = extractor.extract(path)?;
        if des.nrows() == 0 {
            empty += 1;
        }
        pool.extend(des.view());
        pb.set_message(format!("描述符 {}", pool.height()));
    }
    pb.finish_and_clear();

    if empty > 0 {
        warn!("字典集中有 {empty} 张图片没有检测到关键点");
    }
    info!("字典集共提取 {} 个描述符", pool.height());

    check_cluster_input(pool.view(), size)?;
    let centroids = clusterer.cluster(pool.view(), size)?;
    drop(pool);

    Codebook::new(centroids)
}
