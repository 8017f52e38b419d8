// 该文件是 Shanan （山南西风） 项目的一部分。
// src/export/summary.rs - 分类别汇总导出
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

use std::io::Write;
use std::path::{Path, PathBuf};

use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  class_map::ClassMap,
  error::ExportError,
  export::{Export, check_scheme, path_from_url, write_file, write_row},
  record::RecordStore,
};

pub const SUMMARY_HEADER: [&str; 6] = [
  "class_name",
  "total_detected",
  "total_manual",
  "total_count",
  "images_with_detected",
  "images_with_manual",
];

pub fn write_summary<W: Write>(
  writer: &mut W,
  store: &RecordStore,
  class_map: &ClassMap,
) -> std::io::Result<usize> {
  write_row(writer, SUMMARY_HEADER)?;

  let tally = store.tally(class_map);
  for class in &tally {
    write_row(
      writer,
      [
        class.class_name.clone(),
        class.total_detected.to_string(),
        class.total_manual.to_string(),
        class.total_count().to_string(),
        class.images_with_detected.to_string(),
        class.images_with_manual.to_string(),
      ],
    )?;
  }
  Ok(tally.len())
}

pub fn export_summary<P: AsRef<Path>>(
  path: P,
  store: &RecordStore,
  class_map: &ClassMap,
) -> Result<usize, ExportError> {
  write_file(path.as_ref(), store, |writer| {
    write_summary(writer, store, class_map)
  })
}

/// `summary:///path/to/summary.csv`
#[derive(Debug, Clone)]
pub struct SummaryExport {
  path: PathBuf,
}

impl SummaryExport {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    SummaryExport { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl FromUrlWithScheme for SummaryExport {
  const SCHEME: &'static str = "summary";
}

impl FromUrl for SummaryExport {
  type Error = ExportError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    check_scheme::<Self>(url)?;
    Ok(SummaryExport::new(path_from_url(url)?))
  }
}

impl Export for SummaryExport {
  fn export(&self, store: &RecordStore, class_map: &ClassMap) -> Result<usize, ExportError> {
    export_summary(&self.path, store, class_map)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{ClassCounts, ValidationRecord};

  #[test]
  fn summary_rows_per_class() {
    let class_map = ClassMap::from_names(["dog", "cat"]);
    let mut store = RecordStore::initialize(2);
    let detected: ClassCounts = [("cat".to_string(), 2)].into_iter().collect();
    let manual: ClassCounts = [("dog".to_string(), 1)].into_iter().collect();
    store
      .commit(0, ValidationRecord::new("a.jpg", true, detected, manual))
      .unwrap();

    let mut buffer = Vec::new();
    let rows = write_summary(&mut buffer, &store, &class_map).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(rows, 2);
    assert_eq!(
      lines,
      vec![
        "class_name,total_detected,total_manual,total_count,images_with_detected,images_with_manual",
        "cat,2,0,2,1,0",
        "dog,0,1,1,0,1",
      ]
    );
  }

  #[test]
  fn summary_requires_processed_records() {
    let dir = tempfile::tempdir().unwrap();
    let output = SummaryExport::new(dir.path().join("summary.csv"));
    let err = output
      .export(&RecordStore::initialize(1), &ClassMap::from_names(["cat"]))
      .unwrap_err();

    assert!(matches!(err, ExportError::NothingProcessed));
    assert!(!output.path().exists());
  }

  #[test]
  fn scheme_is_checked() {
    let url = Url::parse("table:///tmp/summary.csv").unwrap();
    assert!(matches!(
      SummaryExport::from_url(&url),
      Err(ExportError::SchemeMismatch(_))
    ));
  }
}
