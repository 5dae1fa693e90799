use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::dataset::LabelMap;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    /// SURF，需要启用 surf 特性且 OpenCV 编译时开启了 nonfree 模块
    Surf,
    /// SIFT，固定 128 维
    Sift,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectorOptions {
    /// 特征检测器
    #[arg(long, value_enum, default_value_t = Detector::Surf)]
    pub detector: Detector,
    /// 使用 128 维的 SURF 扩展描述符，默认为 64 维
    #[arg(short = 'x', long)]
    pub extended: bool,
    /// SURF Hessian 阈值
    #[arg(long, value_name = "THRESHOLD", default_value_t = 100.)]
    pub hessian_threshold: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self { detector: Detector::Surf, extended: false, hessian_threshold: 100. }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct KMeansOptions {
    /// KMeans 最大迭代次数
    #[arg(long, value_name = "N", default_value_t = 10, value_parser = clap::value_parser!(i32).range(1..))]
    pub max_iter: i32,
    /// KMeans 中心点移动小于该值时停止迭代
    #[arg(long, value_name = "EPS", default_value_t = 1.0)]
    pub epsilon: f64,
    /// KMeans 使用不同随机初始中心的尝试次数，取最紧凑的结果
    #[arg(long, value_name = "N", default_value_t = 10, value_parser = clap::value_parser!(i32).range(1..))]
    pub attempts: i32,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self { max_iter: 10, epsilon: 1.0, attempts: 10 }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SvmOptions {
    /// SVM 惩罚系数 C
    #[arg(long, value_name = "C", default_value_t = 100.)]
    pub svm_c: f64,
    /// SVM gamma，线性核下不起作用
    #[arg(long, value_name = "GAMMA", default_value_t = 1.)]
    pub svm_gamma: f64,
}

impl Default for SvmOptions {
    fn default() -> Self {
        Self { svm_c: 100., svm_gamma: 1. }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imclassify", version, about = "基于视觉词袋的 SPM 图片分类")]
pub struct Opts {
    /// 视觉词典大小，即聚类中心数量
    #[arg(short = 'k', long, value_name = "K", default_value_t = 100, value_parser = parse_dictionary_size)]
    pub dictionary_size: usize,
    /// 空间金字塔层数，目前只做校验，不参与直方图计算
    #[arg(short = 'l', long, value_name = "N", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub levels: u32,
    /// 数据集根目录，需包含 Training、Testing、Dictionary 三个子目录
    #[arg(short = 'r', long, value_name = "DIR", default_value = "Dataset")]
    pub root: PathBuf,
    /// 参与计算的图片文件名后缀
    #[arg(short, long, default_value = "_thumb.jpg")]
    pub suffix: String,
    /// 类别目录名列表，用逗号分隔，标签按顺序从 0 开始编号
    #[arg(long, value_name = "NAMES", default_value = "Burger,Drink,Pizza,Salad,Sandwich,Sub")]
    pub labels: LabelMap,
    #[command(flatten)]
    pub detector: DetectorOptions,
    #[command(flatten)]
    pub kmeans: KMeansOptions,
    #[command(flatten)]
    pub svm: SvmOptions,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
    /// 在图片上绘制检测到的关键点并保存，然后退出
    #[arg(long, num_args = 2, value_names = ["IMAGE", "OUTPUT"])]
    pub show_keypoints: Option<Vec<PathBuf>>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

fn parse_dictionary_size(s: &str) -> Result<usize, String> {
    let k: usize = s.parse().map_err(|e| format!("无效的词典大小 {s}: {e}"))?;
    if k == 0 {
        return Err("词典大小必须大于 0".to_string());
    }
    Ok(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Opts::try_parse_from(["imclassify"]).unwrap();
        assert_eq!(opts.dictionary_size, 100);
        assert_eq!(opts.levels, 3);
        assert_eq!(opts.root, PathBuf::from("Dataset"));
        assert_eq!(opts.suffix, "_thumb.jpg");
        assert_eq!(opts.labels, LabelMap::default());
        assert_eq!(opts.detector.detector, Detector::Surf);
        assert!(!opts.detector.extended);
        assert_eq!(opts.kmeans.max_iter, 10);
        assert_eq!(opts.kmeans.attempts, 10);
        assert_eq!(opts.svm.svm_c, 100.);
        assert_eq!(opts.output_format, OutputFormat::Table);
        assert!(opts.show_keypoints.is_none());
    }

    #[test]
    fn short_flags() {
        let opts =
            Opts::try_parse_from(["imclassify", "-k", "4", "-l", "2", "-r", "/data", "-x"]).unwrap();
        assert_eq!(opts.dictionary_size, 4);
        assert_eq!(opts.levels, 2);
        assert_eq!(opts.root, PathBuf::from("/data"));
        assert!(opts.detector.extended);
    }

    #[test]
    fn custom_labels() {
        let opts = Opts::try_parse_from(["imclassify", "--labels", "Cat,Dog"]).unwrap();
        assert_eq!(opts.labels.names(), &["Cat".to_string(), "Dog".to_string()]);
    }

    #[test]
    fn invalid_values() {
        assert!(Opts::try_parse_from(["imclassify", "-k", "0"]).is_err());
        assert!(Opts::try_parse_from(["imclassify", "-l", "0"]).is_err());
        assert!(Opts::try_parse_from(["imclassify", "--labels", "Cat,Cat"]).is_err());
    }

    #[test]
    fn show_keypoints_takes_two_paths() {
        let opts =
            Opts::try_parse_from(["imclassify", "--show-keypoints", "in.jpg", "out.jpg"]).unwrap();
        assert_eq!(
            opts.show_keypoints,
            Some(vec![PathBuf::from("in.jpg"), PathBuf::from("out.jpg")])
        );
    }
}
