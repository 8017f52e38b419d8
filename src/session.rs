// 该文件是 Shanan （山南西风） 项目的一部分。
// src/session.rs - 核对会话
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

use std::path::Path;

use tracing::{debug, info};

use crate::{
  class_map::{ClassId, ClassMap, DataDescriptor},
  dataset::{CoverageSummary, DetectionCounts, DetectionResolver, DetectionView, ImageEntry, LabelRecord},
  diagnostic::{DiagnosticSink, TracingSink},
  error::{ConfigError, ExportError, RecordError, ValidatorError},
  export::{Export, export_summary, export_table},
  record::{ClassCounts, Progress, RecordSlot, RecordStore, ValidationRecord},
};

/// 一次核对会话：类别映射、排好序的图像列表以及每张图像的核对记录
///
/// 展示层通过索引访问图像，并在用户保存时提交人工计数。
pub struct Session<S = TracingSink> {
  descriptor: DataDescriptor,
  resolver: DetectionResolver<S>,
  images: Vec<ImageEntry>,
  coverage: CoverageSummary,
  records: RecordStore,
  current: usize,
}

impl Session<TracingSink> {
  pub fn open<D, R>(descriptor_path: D, results_dir: R) -> Result<Self, ValidatorError>
  where
    D: AsRef<Path>,
    R: AsRef<Path>,
  {
    Self::open_with_sink(descriptor_path, results_dir, TracingSink)
  }
}

impl<S: DiagnosticSink> Session<S> {
  pub fn open_with_sink<D, R>(
    descriptor_path: D,
    results_dir: R,
    sink: S,
  ) -> Result<Self, ValidatorError>
  where
    D: AsRef<Path>,
    R: AsRef<Path>,
  {
    let descriptor = DataDescriptor::load(descriptor_path)?;
    Self::from_descriptor(descriptor, results_dir, sink)
  }

  pub fn from_descriptor<R: AsRef<Path>>(
    descriptor: DataDescriptor,
    results_dir: R,
    sink: S,
  ) -> Result<Self, ValidatorError> {
    let resolver =
      DetectionResolver::with_sink(results_dir, descriptor.class_map().clone(), sink)?;
    let images = resolver.enumerate()?;
    if images.is_empty() {
      return Err(ConfigError::NoImages(resolver.results_dir().to_path_buf()).into());
    }

    let coverage = resolver.coverage_of(&images);
    let records = RecordStore::initialize(images.len());
    info!("数据集加载完成，共 {} 张图像", images.len());

    Ok(Session {
      descriptor,
      resolver,
      images,
      coverage,
      records,
      current: 0,
    })
  }

  pub fn descriptor(&self) -> &DataDescriptor {
    &self.descriptor
  }

  pub fn class_map(&self) -> &ClassMap {
    self.descriptor.class_map()
  }

  pub fn resolver(&self) -> &DetectionResolver<S> {
    &self.resolver
  }

  pub fn images(&self) -> &[ImageEntry] {
    &self.images
  }

  pub fn image(&self, index: usize) -> Result<&ImageEntry, RecordError> {
    self.images.get(index).ok_or(RecordError::IndexOutOfRange {
      index,
      len: self.images.len(),
    })
  }

  /// 加载时统计的标签覆盖情况
  pub fn coverage(&self) -> CoverageSummary {
    self.coverage
  }

  pub fn records(&self) -> &RecordStore {
    &self.records
  }

  pub fn detections(&self, index: usize) -> Result<Option<Vec<ClassId>>, RecordError> {
    let entry = self.image(index)?;
    Ok(self.resolver.detection_class_ids(entry))
  }

  pub fn label(&self, index: usize) -> Result<LabelRecord, RecordError> {
    let entry = self.image(index)?;
    Ok(self.resolver.label_for(entry))
  }

  pub fn detection_view(&self, index: usize) -> Result<DetectionView, RecordError> {
    let detections = self.detections(index)?;
    Ok(DetectionView::new(detections.as_deref(), self.class_map()))
  }

  pub fn commit_record(
    &mut self,
    index: usize,
    detected_counts: ClassCounts,
    manual_counts: ClassCounts,
    has_label_file: bool,
  ) -> Result<(), RecordError> {
    let image_name = self.image(index)?.file_name().to_string();
    self.records.commit(
      index,
      ValidationRecord::new(image_name, has_label_file, detected_counts, manual_counts),
    )
  }

  /// 重新读取标签文件得到检测数量，与人工计数一起提交
  pub fn save(&mut self, index: usize, manual_counts: ClassCounts) -> Result<(), RecordError> {
    let detections = self.detections(index)?;
    let detected_counts = detections
      .as_deref()
      .map(|ids| DetectionCounts::from_class_ids(ids).by_name(self.class_map()))
      .unwrap_or_default();
    self.commit_record(index, detected_counts, manual_counts, detections.is_some())
  }

  /// 已保存的人工计数，用于重新访问时回填
  pub fn manual_counts(&self, index: usize) -> Option<&ClassCounts> {
    self
      .records
      .get(index)
      .and_then(RecordSlot::record)
      .map(ValidationRecord::manual_counts)
  }

  pub fn progress(&self) -> Progress {
    self.records.progress()
  }

  pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize, ExportError> {
    export_table(path, &self.records, self.class_map())
  }

  pub fn export_summary<P: AsRef<Path>>(&self, path: P) -> Result<usize, ExportError> {
    export_summary(path, &self.records, self.class_map())
  }

  pub fn export_to<E: Export + ?Sized>(&self, output: &E) -> Result<usize, ExportError> {
    output.export(&self.records, self.class_map())
  }

  pub fn current_index(&self) -> usize {
    self.current
  }

  pub fn current_image(&self) -> &ImageEntry {
    &self.images[self.current]
  }

  pub fn go_to(&mut self, index: usize) -> Result<(), RecordError> {
    self.image(index)?;
    self.current = index;
    debug!("切换到第 {} 张图像", index);
    Ok(())
  }

  pub fn has_previous(&self) -> bool {
    self.current > 0
  }

  pub fn has_next(&self) -> bool {
    self.current + 1 < self.images.len()
  }

  pub fn previous(&mut self) -> bool {
    if !self.has_previous() {
      return false;
    }
    self.current -= 1;
    true
  }

  pub fn next(&mut self) -> bool {
    if !self.has_next() {
      return false;
    }
    self.current += 1;
    true
  }

  /// 保存当前图像并前进到下一张（已在最后一张时停留）
  pub fn save_current(&mut self, manual_counts: ClassCounts) -> Result<(), RecordError> {
    self.save(self.current, manual_counts)?;
    self.next();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostic::MemorySink;

  fn dataset(images: &[(&str, Option<&str>)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("labels")).unwrap();
    for (name, label) in images {
      std::fs::write(dir.path().join(name), b"").unwrap();
      if let Some(content) = label {
        let stem = Path::new(name).file_stem().unwrap();
        let label_path = dir.path().join("labels").join(stem).with_extension("txt");
        std::fs::write(label_path, content).unwrap();
      }
    }
    dir
  }

  fn descriptor() -> DataDescriptor {
    DataDescriptor::from_yaml_str("nc: 2\nnames: [cat, dog]\n").unwrap()
  }

  #[test]
  fn empty_results_dir_is_rejected() {
    let dir = dataset(&[]);
    let err = Session::from_descriptor(descriptor(), dir.path(), MemorySink::new()).err();
    assert!(matches!(
      err,
      Some(ValidatorError::Config(ConfigError::NoImages(_)))
    ));
  }

  #[test]
  fn save_counts_detections_by_name() {
    let dir = dataset(&[("a.jpg", Some("1 .5 .5 .1 .1\n1 .2 .2 .1 .1\n0 .1 .1 .1 .1\n"))]);
    let mut session = Session::from_descriptor(descriptor(), dir.path(), MemorySink::new()).unwrap();

    session.save(0, ClassCounts::new()).unwrap();
    let record = session.records().get(0).and_then(RecordSlot::record).unwrap();
    assert!(record.has_label_file());
    assert_eq!(record.detected("dog"), 2);
    assert_eq!(record.detected("cat"), 1);
  }

  #[test]
  fn navigation_and_auto_advance() {
    let dir = dataset(&[("a.jpg", None), ("b.jpg", None)]);
    let mut session = Session::from_descriptor(descriptor(), dir.path(), MemorySink::new()).unwrap();

    assert!(!session.has_previous());
    assert!(!session.previous());

    let manual: ClassCounts = [("cat".to_string(), 2)].into_iter().collect();
    session.save_current(manual.clone()).unwrap();
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.current_image().file_name(), "b.jpg");

    session.save_current(ClassCounts::new()).unwrap();
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.progress(), Progress { processed: 2, total: 2 });

    session.go_to(0).unwrap();
    assert_eq!(session.manual_counts(0), Some(&manual));
    assert!(session.go_to(5).is_err());
  }

  #[test]
  fn out_of_range_requests_fail() {
    let dir = dataset(&[("a.jpg", None)]);
    let mut session = Session::from_descriptor(descriptor(), dir.path(), MemorySink::new()).unwrap();

    assert!(session.detections(1).is_err());
    assert!(session.detection_view(3).is_err());
    assert_eq!(
      session.commit_record(1, ClassCounts::new(), ClassCounts::new(), false),
      Err(RecordError::IndexOutOfRange { index: 1, len: 1 })
    );
  }
}
