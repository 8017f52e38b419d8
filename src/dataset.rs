// 该文件是 Shanan （山南西风） 项目的一部分。
// src/dataset.rs - 推理结果目录与标签文件匹配
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
  class_map::{ClassId, ClassMap},
  diagnostic::{Diagnostic, DiagnosticSink, TracingSink},
  error::ConfigError,
};

mod counts;
mod label;

pub use self::counts::{ClassCount, DetectionCounts, DetectionView};
pub use self::label::{
  Detection, DetectionRecord, LabelParseError, parse_class_ids, parse_detections,
};

/// 支持的图像扩展名，区分大小写
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];
pub const LABELS_DIR_NAME: &str = "labels";
const LABEL_EXTENSION: &str = "txt";

/// 结果目录中的一张图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
  path: PathBuf,
  file_name: String,
  stem: String,
}

impl ImageEntry {
  /// 扩展名不在支持列表中时返回 `None`
  pub fn from_path(path: PathBuf) -> Option<Self> {
    let extension = path.extension()?.to_str()?;
    if !IMAGE_EXTENSIONS.contains(&extension) {
      return None;
    }
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let stem = path.file_stem()?.to_string_lossy().into_owned();
    Some(ImageEntry {
      path,
      file_name,
      stem,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  pub fn stem(&self) -> &str {
    &self.stem
  }
}

/// 标签文件状态，不存在与为空必须区分
#[derive(Debug, Clone, PartialEq)]
pub enum LabelRecord {
  Absent,
  Empty,
  Populated(Vec<Detection>),
}

impl LabelRecord {
  fn from_detections(detections: Vec<Detection>) -> Self {
    if detections.is_empty() {
      LabelRecord::Empty
    } else {
      LabelRecord::Populated(detections)
    }
  }

  pub fn has_label_file(&self) -> bool {
    !matches!(self, LabelRecord::Absent)
  }

  pub fn detections(&self) -> &[Detection] {
    match self {
      LabelRecord::Populated(detections) => detections,
      _ => &[],
    }
  }

  pub fn class_ids(&self) -> Option<Vec<ClassId>> {
    match self {
      LabelRecord::Absent => None,
      _ => Some(self.detections().iter().map(|d| d.class_id).collect()),
    }
  }
}

/// 标签覆盖情况汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
  pub total_images: usize,
  pub with_labels: usize,
  pub without_labels: usize,
}

impl fmt::Display for CoverageSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Total: {} | With Labels: {} | Without Labels: {}",
      self.total_images, self.with_labels, self.without_labels
    )
  }
}

/// 列出结果目录中的图像（不递归），按文件名排序
pub fn enumerate_images<P: AsRef<Path>>(results_dir: P) -> Result<Vec<ImageEntry>, ConfigError> {
  let results_dir = results_dir.as_ref();
  if !results_dir.is_dir() {
    return Err(ConfigError::ResultsDirNotFound(results_dir.to_path_buf()));
  }

  let dir_error = |source| ConfigError::ResultsDirIo {
    path: results_dir.to_path_buf(),
    source,
  };

  let mut images = Vec::new();
  for entry in std::fs::read_dir(results_dir).map_err(dir_error)? {
    let path = entry.map_err(dir_error)?.path();
    if !path.is_file() {
      continue;
    }
    if let Some(image) = ImageEntry::from_path(path) {
      images.push(image);
    }
  }
  images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

  debug!("在 {} 中找到 {} 张图像", results_dir.display(), images.len());
  Ok(images)
}

/// 检测结果解析器
///
/// 标签文件位于结果目录下的 `labels/<stem>.txt`。已存在的标签文件读取或解析失败时，
/// 通过 [`DiagnosticSink`] 报告并按空检测结果处理，不会中断整个扫描。
pub struct DetectionResolver<S = TracingSink> {
  results_dir: PathBuf,
  labels_dir: PathBuf,
  class_map: ClassMap,
  sink: S,
}

impl DetectionResolver<TracingSink> {
  pub fn new<P: AsRef<Path>>(results_dir: P, class_map: ClassMap) -> Result<Self, ConfigError> {
    Self::with_sink(results_dir, class_map, TracingSink)
  }
}

impl<S: DiagnosticSink> DetectionResolver<S> {
  pub fn with_sink<P: AsRef<Path>>(
    results_dir: P,
    class_map: ClassMap,
    sink: S,
  ) -> Result<Self, ConfigError> {
    let results_dir = results_dir.as_ref().to_path_buf();
    if !results_dir.is_dir() {
      return Err(ConfigError::ResultsDirNotFound(results_dir));
    }

    info!("结果目录: {}", results_dir.display());
    Ok(DetectionResolver {
      labels_dir: results_dir.join(LABELS_DIR_NAME),
      results_dir,
      class_map,
      sink,
    })
  }

  pub fn results_dir(&self) -> &Path {
    &self.results_dir
  }

  pub fn labels_dir(&self) -> &Path {
    &self.labels_dir
  }

  pub fn class_map(&self) -> &ClassMap {
    &self.class_map
  }

  pub fn sink(&self) -> &S {
    &self.sink
  }

  pub fn enumerate(&self) -> Result<Vec<ImageEntry>, ConfigError> {
    enumerate_images(&self.results_dir)
  }

  /// 标签文件存在时返回其路径
  pub fn label_path(&self, entry: &ImageEntry) -> Option<PathBuf> {
    let path = self
      .labels_dir
      .join(format!("{}.{}", entry.stem(), LABEL_EXTENSION));
    path.exists().then_some(path)
  }

  pub fn label_for(&self, entry: &ImageEntry) -> LabelRecord {
    match self.label_path(entry) {
      None => LabelRecord::Absent,
      Some(path) => {
        let detections = self.collapse(read_label(&path, parse_detections));
        LabelRecord::from_detections(detections)
      }
    }
  }

  /// `None` 表示没有标签文件，空列表表示标签文件中没有检测
  pub fn detection_class_ids(&self, entry: &ImageEntry) -> Option<Vec<ClassId>> {
    let path = self.label_path(entry)?;
    Some(self.collapse(read_label(&path, parse_class_ids)))
  }

  pub fn parse_detailed(&self, label_path: &Path) -> Vec<DetectionRecord> {
    self
      .collapse(read_label(label_path, parse_detections))
      .into_iter()
      .map(|detection| DetectionRecord {
        class_name: self.class_map.name_or_unknown(detection.class_id),
        detection,
      })
      .collect()
  }

  pub fn summarize(&self) -> Result<CoverageSummary, ConfigError> {
    Ok(self.coverage_of(&self.enumerate()?))
  }

  /// 对已列出的图像统计标签覆盖情况
  pub fn coverage_of(&self, entries: &[ImageEntry]) -> CoverageSummary {
    let summary = entries
      .iter()
      .fold(CoverageSummary::default(), |mut summary, entry| {
        summary.total_images += 1;
        if self.label_path(entry).is_some() {
          summary.with_labels += 1;
        } else {
          summary.without_labels += 1;
        }
        summary
      });
    info!("标签覆盖情况: {}", summary);
    summary
  }

  fn collapse<T>(&self, result: Result<Vec<T>, Diagnostic>) -> Vec<T> {
    result.unwrap_or_else(|diagnostic| {
      self.sink.report(diagnostic);
      Vec::new()
    })
  }
}

fn read_label<T>(
  path: &Path,
  parse: fn(&str) -> Result<Vec<T>, LabelParseError>,
) -> Result<Vec<T>, Diagnostic> {
  let content = std::fs::read_to_string(path)
    .map_err(|err| Diagnostic::read_failure(path.to_path_buf(), &err))?;
  parse(&content).map_err(|err| Diagnostic::parse_failure(path.to_path_buf(), err.to_string()))
}
