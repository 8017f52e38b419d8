// 该文件是 Shanan （山南西风） 项目的一部分。
// src/dataset/counts.rs - 检测数量统计与展示
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

use crate::class_map::{ClassId, ClassMap};
use crate::record::ClassCounts;

/// 按类别编号统计的检测数量
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionCounts {
  counts: BTreeMap<ClassId, u32>,
}

impl DetectionCounts {
  pub fn from_class_ids(class_ids: &[ClassId]) -> Self {
    let mut counts = BTreeMap::new();
    for id in class_ids {
      *counts.entry(*id).or_insert(0) += 1;
    }
    DetectionCounts { counts }
  }

  pub fn get(&self, id: ClassId) -> u32 {
    self.counts.get(&id).copied().unwrap_or(0)
  }

  pub fn total(&self) -> u32 {
    self.counts.values().sum()
  }

  pub fn is_empty(&self) -> bool {
    self.counts.is_empty()
  }

  /// 按类别编号升序
  pub fn iter(&self) -> impl Iterator<Item = (ClassId, u32)> + '_ {
    self.counts.iter().map(|(id, count)| (*id, *count))
  }

  /// 转换为按名称统计，同名的不同编号会累加
  pub fn by_name(&self, class_map: &ClassMap) -> ClassCounts {
    let mut by_name = ClassCounts::new();
    for (id, count) in self.iter() {
      *by_name.entry(class_map.name_or_unknown(id)).or_insert(0) += count;
    }
    by_name
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
  pub class_id: ClassId,
  pub class_name: String,
  pub count: u32,
}

/// 当前图像的检测结果视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionView {
  /// 没有标签文件，需要人工填写
  MissingLabel,
  /// 标签文件存在但没有检测
  NoObjects,
  Detected(Vec<ClassCount>),
}

impl DetectionView {
  pub fn new(class_ids: Option<&[ClassId]>, class_map: &ClassMap) -> Self {
    match class_ids {
      None => DetectionView::MissingLabel,
      Some([]) => DetectionView::NoObjects,
      Some(ids) => DetectionView::Detected(
        DetectionCounts::from_class_ids(ids)
          .iter()
          .map(|(class_id, count)| ClassCount {
            class_id,
            class_name: class_map.name_or_unknown(class_id),
            count,
          })
          .collect(),
      ),
    }
  }

  pub fn is_warning(&self) -> bool {
    matches!(self, DetectionView::MissingLabel)
  }
}

impl fmt::Display for DetectionView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DetectionView::MissingLabel => write!(f, "⚠ No label file\nEnter counts manually"),
      DetectionView::NoObjects => write!(f, "ℹ No objects detected"),
      DetectionView::Detected(counts) => {
        write!(f, "Detected:")?;
        for item in counts {
          write!(f, "\n  • {}: {}", item.class_name, item.count)?;
        }
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_group_by_id() {
    let counts = DetectionCounts::from_class_ids(&[2, 0, 2, 2]);
    assert_eq!(counts.get(2), 3);
    assert_eq!(counts.get(0), 1);
    assert_eq!(counts.get(5), 0);
    assert_eq!(counts.total(), 4);
    assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(0, 1), (2, 3)]);
  }

  #[test]
  fn shared_names_are_summed_and_unknown_ids_named() {
    let map: ClassMap = [(0, "car".to_string()), (1, "car".to_string())]
      .into_iter()
      .collect();
    let by_name = DetectionCounts::from_class_ids(&[0, 1, 1, 7]).by_name(&map);

    assert_eq!(by_name.get("car"), Some(&3));
    assert_eq!(by_name.get("Unknown (7)"), Some(&1));
  }

  #[test]
  fn negative_ids_fall_back_to_unknown() {
    let map = ClassMap::from_names(["cat"]);
    let view = DetectionView::new(Some(&[-1, 0]), &map);
    assert_eq!(view.to_string(), "Detected:\n  • Unknown (-1): 1\n  • cat: 1");
  }

  #[test]
  fn view_distinguishes_absent_and_empty() {
    let map = ClassMap::from_names(["cat", "dog"]);

    let absent = DetectionView::new(None, &map);
    assert!(absent.is_warning());
    assert_eq!(absent.to_string(), "⚠ No label file\nEnter counts manually");

    let empty = DetectionView::new(Some(&[]), &map);
    assert!(!empty.is_warning());
    assert_eq!(empty.to_string(), "ℹ No objects detected");
  }

  #[test]
  fn view_lists_classes_in_id_order() {
    let map = ClassMap::from_names(["cat", "dog"]);
    let view = DetectionView::new(Some(&[1, 0, 1]), &map);
    assert_eq!(view.to_string(), "Detected:\n  • cat: 1\n  • dog: 2");
  }
}
