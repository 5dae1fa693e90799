use anyhow::{Context, Result};
use log::info;

use crate::classifier::Accuracy;
use crate::config::{Opts, OutputFormat};
use crate::detector::FeatureDetector;
use crate::kmeans::CvKMeans;
use crate::pipeline::{Pipeline, Report};
use crate::svm::CvSvm;

pub fn run(opts: &Opts) -> Result<()> {
    let mut detector = FeatureDetector::create(&opts.detector)?;

    if let Some(paths) = &opts.show_keypoints {
        let (image, output) = (&paths[0], &paths[1]);
        let n = detector.show_keypoints(image, output)?;
        println!("{n} 个关键点已绘制到 {}", output.display());
        return Ok(());
    }

    info!("空间金字塔层数 = {}，当前仅使用单层词袋直方图", opts.levels);

    let mut pipeline = Pipeline::new(
        detector,
        CvKMeans::from(&opts.kmeans),
        CvSvm::from(&opts.svm),
        opts.dictionary_size,
    );
    let report = pipeline
        .run(&opts.root, &opts.suffix, &opts.labels)
        .with_context(|| format!("数据集 {} 处理失败", opts.root.display()))?;

    print_report(&report, opts.output_format)
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?)
        }
        OutputFormat::Table => {
            let (words, dim) = report.dictionary;
            println!("dictionary\t{words}x{dim}");
            print_accuracy("train", &report.train);
            print_accuracy("test", &report.test);
        }
    }
    Ok(())
}

fn print_accuracy(name: &str, accuracy: &Accuracy) {
    println!("{name} accuracy\t{:.4}\t{}", accuracy.ratio(), accuracy);
}
