// 该文件是 Shanan （山南西风） 项目的一部分。
// src/export/table.rs - 逐图像核对表导出
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

fn yes_no(flag: bool) -> &'static str {
  if flag { "Yes" } else { "No" }
}

/// `image_name, has_label_file, detected_*, manual_*, total_detected, total_manual, processed`
pub fn table_header(class_map: &ClassMap) -> Vec<String> {
  let names = class_map.sorted_names();
  let mut header = vec!["image_name".to_string(), "has_label_file".to_string()];
  header.extend(names.iter().map(|name| format!("detected_{}", name)));
  header.extend(names.iter().map(|name| format!("manual_{}", name)));
  header.extend(["total_detected", "total_manual", "processed"].map(String::from));
  header
}

/// 只写出已处理的记录，返回数据行数
pub fn write_table<W: Write>(
  writer: &mut W,
  store: &RecordStore,
  class_map: &ClassMap,
) -> std::io::Result<usize> {
  let names = class_map.sorted_names();
  write_row(writer, table_header(class_map))?;

  let mut rows = 0;
  for record in store.processed() {
    let detected: Vec<u32> = names.iter().map(|name| record.detected(name)).collect();
    let manual: Vec<u32> = names.iter().map(|name| record.manual(name)).collect();
    let total_detected: u64 = detected.iter().map(|&c| u64::from(c)).sum();
    let total_manual: u64 = manual.iter().map(|&c| u64::from(c)).sum();

    let mut row = vec![
      record.image_name().to_string(),
      yes_no(record.has_label_file()).to_string(),
    ];
    row.extend(detected.iter().map(u32::to_string));
    row.extend(manual.iter().map(u32::to_string));
    row.push(total_detected.to_string());
    row.push(total_manual.to_string());
    row.push(yes_no(true).to_string());

    write_row(writer, row)?;
    rows += 1;
  }
  Ok(rows)
}

pub fn export_table<P: AsRef<Path>>(
  path: P,
  store: &RecordStore,
  class_map: &ClassMap,
) -> Result<usize, ExportError> {
  write_file(path.as_ref(), store, |writer| write_table(writer, store, class_map))
}

/// `table:///path/to/result.csv`
#[derive(Debug, Clone)]
pub struct TableExport {
  path: PathBuf,
}

impl TableExport {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    TableExport { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl FromUrlWithScheme for TableExport {
  const SCHEME: &'static str = "table";
}

impl FromUrl for TableExport {
  type Error = ExportError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    check_scheme::<Self>(url)?;
    Ok(TableExport::new(path_from_url(url)?))
  }
}

impl Export for TableExport {
  fn export(&self, store: &RecordStore, class_map: &ClassMap) -> Result<usize, ExportError> {
    export_table(&self.path, store, class_map)
  }
}
