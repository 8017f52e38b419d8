// 该文件是 Shanan （山南西风） 项目的一部分。
// src/export.rs - 核对结果导出
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

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, class_map::ClassMap, error::ExportError, record::RecordStore,
};

mod summary;
mod table;

pub use self::summary::{SUMMARY_HEADER, SummaryExport, export_summary, write_summary};
pub use self::table::{TableExport, export_table, table_header, write_table};

const LINE_TERMINATOR: &str = "\r\n";

pub trait Export {
  /// 写出导出文件，返回数据行数
  fn export(&self, store: &RecordStore, class_map: &ClassMap) -> Result<usize, ExportError>;
}

/// 每次导出附带记录的元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMetadata {
  pub export_date: String,
  pub exporter_version: &'static str,
}

impl ExportMetadata {
  pub fn now() -> Self {
    ExportMetadata {
      export_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
      exporter_version: env!("CARGO_PKG_VERSION"),
    }
  }
}

/// 按 URL 方案选择导出方式
pub enum ExportWrapper {
  Table(TableExport),
  Summary(SummaryExport),
}

impl FromUrl for ExportWrapper {
  type Error = ExportError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      TableExport::SCHEME => Ok(ExportWrapper::Table(TableExport::from_url(url)?)),
      SummaryExport::SCHEME => Ok(ExportWrapper::Summary(SummaryExport::from_url(url)?)),
      other => Err(ExportError::SchemeMismatch(format!(
        "不支持的导出方式 '{}'，可选 '{}' 或 '{}'",
        other,
        TableExport::SCHEME,
        SummaryExport::SCHEME
      ))),
    }
  }
}

impl Export for ExportWrapper {
  fn export(&self, store: &RecordStore, class_map: &ClassMap) -> Result<usize, ExportError> {
    match self {
      ExportWrapper::Table(output) => output.export(store, class_map),
      ExportWrapper::Summary(output) => output.export(store, class_map),
    }
  }
}

fn check_scheme<T: FromUrlWithScheme>(url: &Url) -> Result<(), ExportError> {
  if url.scheme() != T::SCHEME {
    return Err(ExportError::SchemeMismatch(format!(
      "期望导出方式 '{}', 实际导出方式 '{}'",
      T::SCHEME,
      url.scheme()
    )));
  }
  Ok(())
}

/// URL 路径经过百分号解码后作为文件路径
fn path_from_url(url: &Url) -> Result<PathBuf, ExportError> {
  let path = urlencoding::decode(url.path())
    .map_err(|err| ExportError::InvalidPath(format!("{}: {}", url, err)))?;
  if path.is_empty() || path.ends_with('/') {
    return Err(ExportError::InvalidPath(url.to_string()));
  }
  Ok(PathBuf::from(path.into_owned()))
}

/// 包含逗号、引号或换行的字段加引号
fn csv_field(value: &str) -> Cow<'_, str> {
  if value.contains([',', '"', '\r', '\n']) {
    Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
  } else {
    Cow::Borrowed(value)
  }
}

fn write_row<W, I, S>(writer: &mut W, fields: I) -> std::io::Result<()>
where
  W: Write,
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let line = fields
    .into_iter()
    .map(|field| csv_field(field.as_ref()).into_owned())
    .collect::<Vec<_>>()
    .join(",");
  writer.write_all(line.as_bytes())?;
  writer.write_all(LINE_TERMINATOR.as_bytes())
}

/// 检查通过后才创建目标文件
fn write_file<F>(path: &Path, store: &RecordStore, write: F) -> Result<usize, ExportError>
where
  F: FnOnce(&mut BufWriter<File>) -> std::io::Result<usize>,
{
  if !store.has_processed() {
    return Err(ExportError::NothingProcessed);
  }

  let io_error = |source| ExportError::Io {
    path: path.to_path_buf(),
    source,
  };

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).map_err(io_error)?;
  }

  let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
  let rows = write(&mut writer).map_err(io_error)?;
  writer.flush().map_err(io_error)?;

  let metadata = ExportMetadata::now();
  info!(
    "导出 {} 条记录到 {} (时间: {}, 版本: {})",
    rows,
    path.display(),
    metadata.export_date,
    metadata.exporter_version
  );
  Ok(rows)
}
