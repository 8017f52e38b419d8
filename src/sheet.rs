// 该文件是 Shanan （山南西风） 项目的一部分。
// src/sheet.rs - 人工计数表
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
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::record::ClassCounts;

#[derive(Error, Debug)]
pub enum SheetError {
  #[error("人工计数表不存在: {0}")]
  NotFound(PathBuf),
  #[error("无法读取人工计数表 {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("人工计数表解析失败: {0}")]
  Parse(#[from] serde_yaml::Error),
}

/// 图像文件名到人工计数的 YAML 表
///
/// ```yaml
/// a.jpg:
///   cat: 2
/// b.jpg: {}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualSheet {
  entries: BTreeMap<String, ClassCounts>,
}

impl ManualSheet {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
    let path = path.as_ref();
    if !path.exists() {
      return Err(SheetError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| SheetError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let sheet = Self::from_yaml_str(&text)?;
    info!("人工计数表包含 {} 张图像", sheet.len());
    Ok(sheet)
  }

  pub fn from_yaml_str(text: &str) -> Result<Self, SheetError> {
    if text.trim().is_empty() {
      return Ok(ManualSheet::default());
    }
    let entries: Option<BTreeMap<String, Option<ClassCounts>>> = serde_yaml::from_str(text)?;
    Ok(ManualSheet {
      entries: entries
        .unwrap_or_default()
        .into_iter()
        .map(|(image, counts)| (image, counts.unwrap_or_default()))
        .collect(),
    })
  }

  pub fn get(&self, image_name: &str) -> Option<&ClassCounts> {
    self.entries.get(image_name)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn image_names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }
}
