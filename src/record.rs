// 该文件是 Shanan （山南西风） 项目的一部分。
// src/record.rs - 人工核对记录存储
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

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::{class_map::ClassMap, error::RecordError};

/// 类别名称到数量
pub type ClassCounts = BTreeMap<String, u32>;

/// 一张图像的核对结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecord {
  image_name: String,
  has_label_file: bool,
  detected_counts: ClassCounts,
  // 只保存大于 0 的数量
  manual_counts: ClassCounts,
}

impl ValidationRecord {
  pub fn new(
    image_name: impl Into<String>,
    has_label_file: bool,
    detected_counts: ClassCounts,
    mut manual_counts: ClassCounts,
  ) -> Self {
    manual_counts.retain(|_, count| *count > 0);
    ValidationRecord {
      image_name: image_name.into(),
      has_label_file,
      detected_counts,
      manual_counts,
    }
  }

  pub fn image_name(&self) -> &str {
    &self.image_name
  }

  pub fn has_label_file(&self) -> bool {
    self.has_label_file
  }

  pub fn detected_counts(&self) -> &ClassCounts {
    &self.detected_counts
  }

  pub fn manual_counts(&self) -> &ClassCounts {
    &self.manual_counts
  }

  pub fn detected(&self, class_name: &str) -> u32 {
    self.detected_counts.get(class_name).copied().unwrap_or(0)
  }

  pub fn manual(&self, class_name: &str) -> u32 {
    self.manual_counts.get(class_name).copied().unwrap_or(0)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordSlot {
  #[default]
  Unprocessed,
  Processed(ValidationRecord),
}

impl RecordSlot {
  pub fn is_processed(&self) -> bool {
    matches!(self, RecordSlot::Processed(_))
  }

  pub fn record(&self) -> Option<&ValidationRecord> {
    match self {
      RecordSlot::Processed(record) => Some(record),
      RecordSlot::Unprocessed => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  pub processed: usize,
  pub total: usize,
}

impl fmt::Display for Progress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Progress: {} of {} processed", self.processed, self.total)
  }
}

/// 单个类别在全部已处理记录上的汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTally {
  pub class_name: String,
  pub total_detected: u64,
  pub total_manual: u64,
  pub images_with_detected: usize,
  pub images_with_manual: usize,
}

impl ClassTally {
  pub fn total_count(&self) -> u64 {
    self.total_detected + self.total_manual
  }
}

/// 按图像索引寻址的定长记录存储，加载数据集时分配
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
  slots: Box<[RecordSlot]>,
}

impl RecordStore {
  pub fn initialize(len: usize) -> Self {
    debug!("初始化 {} 条核对记录", len);
    RecordStore {
      slots: vec![RecordSlot::Unprocessed; len].into_boxed_slice(),
    }
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&RecordSlot> {
    self.slots.get(index)
  }

  /// 覆盖写入指定索引的记录，重复提交会替换旧值
  pub fn commit(&mut self, index: usize, record: ValidationRecord) -> Result<(), RecordError> {
    let len = self.slots.len();
    let slot = self
      .slots
      .get_mut(index)
      .ok_or(RecordError::IndexOutOfRange { index, len })?;
    debug!("提交第 {} 条记录: {}", index, record.image_name());
    *slot = RecordSlot::Processed(record);
    Ok(())
  }

  pub fn progress(&self) -> Progress {
    Progress {
      processed: self.processed().count(),
      total: self.slots.len(),
    }
  }

  pub fn processed(&self) -> impl Iterator<Item = &ValidationRecord> {
    self.slots.iter().filter_map(RecordSlot::record)
  }

  pub fn has_processed(&self) -> bool {
    self.processed().next().is_some()
  }

  /// 按排序后的类别名称汇总已处理记录
  pub fn tally(&self, class_map: &ClassMap) -> Vec<ClassTally> {
    class_map
      .sorted_names()
      .into_iter()
      .map(|name| {
        let mut tally = ClassTally {
          class_name: name.to_string(),
          total_detected: 0,
          total_manual: 0,
          images_with_detected: 0,
          images_with_manual: 0,
        };
        for record in self.processed() {
          let detected = record.detected(name);
          let manual = record.manual(name);
          tally.total_detected += u64::from(detected);
          tally.total_manual += u64::from(manual);
          tally.images_with_detected += usize::from(detected > 0);
          tally.images_with_manual += usize::from(manual > 0);
        }
        tally
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counts(pairs: &[(&str, u32)]) -> ClassCounts {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
  }

  #[test]
  fn starts_unprocessed() {
    let store = RecordStore::initialize(3);
    assert_eq!(store.len(), 3);
    assert_eq!(store.progress(), Progress { processed: 0, total: 3 });
    assert!(!store.has_processed());
    assert_eq!(store.get(2), Some(&RecordSlot::Unprocessed));
  }

  #[test]
  fn zero_manual_counts_are_not_stored() {
    let record = ValidationRecord::new(
      "a.jpg",
      true,
      counts(&[("cat", 1)]),
      counts(&[("cat", 0), ("dog", 2)]),
    );
    assert_eq!(record.manual_counts(), &counts(&[("dog", 2)]));
    assert_eq!(record.manual("cat"), 0);
  }

  #[test]
  fn recommit_replaces_values() {
    let mut store = RecordStore::initialize(2);
    store
      .commit(1, ValidationRecord::new("b.jpg", false, ClassCounts::new(), counts(&[("cat", 2)])))
      .unwrap();
    store
      .commit(1, ValidationRecord::new("b.jpg", false, ClassCounts::new(), counts(&[("cat", 5)])))
      .unwrap();

    assert_eq!(store.progress(), Progress { processed: 1, total: 2 });
    assert_eq!(store.get(1).and_then(RecordSlot::record).unwrap().manual("cat"), 5);
    assert_eq!(store.progress().to_string(), "Progress: 1 of 2 processed");
  }

  #[test]
  fn commit_out_of_range() {
    let mut store = RecordStore::initialize(1);
    let err = store
      .commit(4, ValidationRecord::new("x.jpg", true, ClassCounts::new(), ClassCounts::new()))
      .unwrap_err();
    assert_eq!(err, RecordError::IndexOutOfRange { index: 4, len: 1 });
  }

  #[test]
  fn tally_covers_every_class_name() {
    let class_map = ClassMap::from_names(["dog", "cat", "bird"]);
    let mut store = RecordStore::initialize(3);
    store
      .commit(0, ValidationRecord::new("a.jpg", true, counts(&[("cat", 2)]), counts(&[("cat", 1)])))
      .unwrap();
    store
      .commit(2, ValidationRecord::new("c.jpg", true, counts(&[("cat", 1), ("dog", 3)]), ClassCounts::new()))
      .unwrap();

    let tally = store.tally(&class_map);
    let names: Vec<_> = tally.iter().map(|t| t.class_name.as_str()).collect();
    assert_eq!(names, vec!["bird", "cat", "dog"]);

    assert_eq!(tally[0].total_count(), 0);
    assert_eq!(tally[1].total_detected, 3);
    assert_eq!(tally[1].total_manual, 1);
    assert_eq!(tally[1].images_with_detected, 2);
    assert_eq!(tally[1].images_with_manual, 1);
    assert_eq!(tally[2].images_with_detected, 1);
    assert_eq!(tally[2].total_count(), 3);
  }
}
