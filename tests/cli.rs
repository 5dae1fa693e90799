use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use opencv::core::{self, Point, Rect, Scalar};
use opencv::imgcodecs;
use opencv::imgproc;
use opencv::prelude::*;
use predicates::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[derive(Clone, Copy)]
enum Shape {
    Circles,
    Squares,
}

// 生成带有随机图形的灰度图片
fn write_image(path: &Path, shape: Shape, rng: &mut StdRng) -> Result<()> {
    fs::create_dir_all(path.parent().unwrap())?;
    let mut image = Mat::new_rows_cols_with_default(160, 160, core::CV_8UC1, Scalar::all(20.))?;
    for _ in 0..8 {
        let (x, y) = (rng.random_range(20..140), rng.random_range(20..140));
        let size = rng.random_range(6..16);
        let color = Scalar::all(rng.random_range(120..255) as f64);
        match shape {
            Shape::Circles => {
                imgproc::circle(&mut image, Point::new(x, y), size, color, -1, imgproc::LINE_8, 0)?
            }
            Shape::Squares => imgproc::rectangle(
                &mut image,
                Rect::new(x - size, y - size, size * 2, size * 2),
                color,
                -1,
                imgproc::LINE_8,
                0,
            )?,
        }
    }
    let flags = core::Vector::<i32>::new();
    assert!(imgcodecs::imwrite(path.to_str().unwrap(), &image, &flags)?);
    Ok(())
}

#[fixture]
fn dataset() -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();
    let root = dir.path();
    let mut rng = StdRng::seed_from_u64(42);
    for (class, shape) in [("Circles", Shape::Circles), ("Squares", Shape::Squares)] {
        for i in 0..2 {
            let path = root.join(format!("Training/{class}/{i}_thumb.jpg"));
            write_image(&path, shape, &mut rng).unwrap();
        }
        let path = root.join(format!("Testing/{class}/0_thumb.jpg"));
        write_image(&path, shape, &mut rng).unwrap();
    }
    for (i, shape) in [Shape::Circles, Shape::Squares, Shape::Circles].into_iter().enumerate() {
        let path = root.join(format!("Dictionary/{i}_thumb.jpg"));
        write_image(&path, shape, &mut rng).unwrap();
    }
    dir
}

#[test]
fn help() -> Result<()> {
    cargo_run!("imclassify", "--help")
        .success()
        .stdout(predicate::str::contains("--dictionary-size"))
        .stdout(predicate::str::contains("--levels"));
    Ok(())
}

#[rstest]
fn run_table(dataset: assert_fs::TempDir) -> Result<()> {
    cargo_run!(
        "imclassify",
        "-r",
        dataset.path(),
        "-k",
        "4",
        "--detector",
        "sift",
        "--labels",
        "Circles,Squares"
    )
    .success()
    .stdout(predicate::str::contains("dictionary\t4x128"))
    .stdout(predicate::str::contains("train accuracy"))
    .stdout(predicate::str::contains("test accuracy"));
    Ok(())
}

#[rstest]
fn run_json(dataset: assert_fs::TempDir) -> Result<()> {
    let output = cargo_run!(
        "imclassify",
        "-r",
        dataset.path(),
        "-k",
        "4",
        "--detector",
        "sift",
        "--labels",
        "Circles,Squares",
        "--output-format",
        "json"
    )
    .success()
    .get_output()
    .stdout
    .clone();

    let report: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(report["dictionary"], serde_json::json!([4, 128]));
    assert_eq!(report["train"]["total"], 4);
    assert_eq!(report["test"]["total"], 2);
    for phase in ["train", "test"] {
        let ratio = report[phase]["ratio"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&ratio));
    }
    Ok(())
}

#[rstest]
fn unknown_class_directory(dataset: assert_fs::TempDir) -> Result<()> {
    cargo_run!("imclassify", "-r", dataset.path(), "-k", "4", "--detector", "sift")
        .failure()
        .stderr(predicate::str::contains("Circles"));
    Ok(())
}

#[test]
fn missing_dataset() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    cargo_run!("imclassify", "-r", dir.path(), "--detector", "sift")
        .failure()
        .stderr(predicate::str::contains("Training"));
    Ok(())
}

#[rstest]
fn codebook_larger_than_pool(dataset: assert_fs::TempDir) -> Result<()> {
    cargo_run!(
        "imclassify",
        "-r",
        dataset.path(),
        "-k",
        "100000",
        "--detector",
        "sift",
        "--labels",
        "Circles,Squares"
    )
    .failure()
    .stderr(predicate::str::contains("聚类失败"));
    Ok(())
}

#[rstest]
fn show_keypoints(dataset: assert_fs::TempDir) -> Result<()> {
    let input = dataset.path().join("Dictionary/0_thumb.jpg");
    let output = dataset.path().join("keypoints.png");
    cargo_run!("imclassify", "--detector", "sift", "--show-keypoints", &input, &output)
        .success()
        .stdout(predicate::str::contains("个关键点"));
    assert!(output.is_file());
    Ok(())
}
