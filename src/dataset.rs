use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub const DEFAULT_LABELS: &[&str] = &["Burger", "Drink", "Pizza", "Salad", "Sandwich", "Sub"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Split {
    Training,
    Testing,
    Dictionary,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Training, Split::Testing, Split::Dictionary];

    /// 数据集根目录下对应的子目录名
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Training => "Training",
            Split::Testing => "Testing",
            Split::Dictionary => "Dictionary",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 类别目录名到整数标签的映射，标签即名称在列表中的下标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelMap {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self { names: vec![], index: HashMap::new() };
        for name in names {
            let name = name.into();
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::DatasetLayout("类别名不能为空".to_string()));
            }
            if map.index.contains_key(name) {
                return Err(Error::DatasetLayout(format!("类别名重复: {name}")));
            }
            map.index.insert(name.to_string(), map.names.len());
            map.names.push(name.to_string());
        }
        if map.names.is_empty() {
            return Err(Error::DatasetLayout("至少需要一个类别".to_string()));
        }
        Ok(map)
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, label: usize) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().copied()).expect("default labels are valid")
    }
}

impl FromStr for LabelMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split(','))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub path: PathBuf,
    pub label: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub training: Vec<Sample>,
    pub testing: Vec<Sample>,
    pub dictionary: Vec<PathBuf>,
}

impl Dataset {
    /// 扫描数据集根目录
    ///
    /// 根目录下必须存在 `Training/`、`Testing/`、`Dictionary/` 三个子目录，
    /// 只收集文件名以 `suffix` 结尾的普通文件，不跟随符号链接。
    /// 训练集和测试集中图片的类别取自其直接父目录名，并通过 `labels` 转换为标签。
    pub fn scan(root: impl AsRef<Path>, suffix: &str, labels: &LabelMap) -> Result<Self> {
        let root = root.as_ref();
        info!("开始扫描数据集: {}", root.display());

        let mut dataset = Dataset::default();
        for split in Split::ALL {
            let split_root = root.join(split.dir_name());
            if !split_root.is_dir() {
                return Err(Error::DatasetLayout(format!(
                    "缺少 {} 目录: {}",
                    split,
                    split_root.display()
                )));
            }

            let files = collect_files(&split_root, suffix)?;
            debug!("{} 中找到 {} 个文件", split, files.len());

            match split {
                Split::Training => dataset.training = label_files(&split_root, files, labels)?,
                Split::Testing => dataset.testing = label_files(&split_root, files, labels)?,
                Split::Dictionary => dataset.dictionary = files,
            }
        }

        info!(
            "扫描完成，训练集 {} 张，测试集 {} 张，字典集 {} 张",
            dataset.training.len(),
            dataset.testing.len(),
            dataset.dictionary.len()
        );
        let labeled = [(Split::Training, &dataset.training), (Split::Testing, &dataset.testing)];
        for (split, samples) in labeled {
            for (label, count) in class_counts(samples) {
                info!("  {split}/{}: {count}", labels.name(label).unwrap_or("?"));
            }
        }

        Ok(dataset)
    }

    /// 按划分遍历所有文件路径
    pub fn paths(&self) -> impl Iterator<Item = (Split, &Path)> {
        let training = self.training.iter().map(|s| (Split::Training, s.path.as_path()));
        let testing = self.testing.iter().map(|s| (Split::Testing, s.path.as_path()));
        let dictionary = self.dictionary.iter().map(|p| (Split::Dictionary, p.as_path()));
        training.chain(testing).chain(dictionary)
    }
}

fn collect_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn label_files(split_root: &Path, files: Vec<PathBuf>, labels: &LabelMap) -> Result<Vec<Sample>> {
    files
        .into_iter()
        .map(|path| {
            let parent = path.parent().filter(|p| *p != split_root).ok_or_else(|| {
                Error::DatasetLayout(format!("图片不在类别目录中: {}", path.display()))
            })?;
            let name = parent.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
            let label = labels.label(&name).ok_or_else(|| {
                Error::DatasetLayout(format!("未知类别 {:?}: {}", name, path.display()))
            })?;
            Ok(Sample { path, label })
        })
        .collect()
}

fn class_counts(samples: &[Sample]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.label).or_insert(0) += 1;
    }
    counts
}
