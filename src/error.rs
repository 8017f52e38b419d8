// 该文件是 Shanan （山南西风） 项目的一部分。
// src/error.rs - 错误类型定义
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

use std::path::PathBuf;

use thiserror::Error;

/// 配置错误：类别描述文件或结果目录不可用
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("描述文件不存在: {0}")]
  DescriptorNotFound(PathBuf),
  #[error("无法读取描述文件 {path}: {source}")]
  DescriptorIo {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("描述文件解析失败: {0}")]
  Malformed(#[from] serde_yaml::Error),
  #[error("描述文件顶层必须是映射")]
  NotAMapping,
  #[error("描述文件缺少字段 '{0}'")]
  MissingField(&'static str),
  #[error("不支持的 'names' 格式: {0}")]
  UnsupportedNames(String),
  #[error("无效的类别编号: {0}")]
  InvalidClassId(String),
  #[error("无效的类别名称 (编号 {id}): {detail}")]
  InvalidClassName { id: String, detail: String },
  #[error("无效的类别数量 'nc': {0}")]
  InvalidClassCount(String),
  #[error("结果目录不存在: {0}")]
  ResultsDirNotFound(PathBuf),
  #[error("无法读取结果目录 {path}: {source}")]
  ResultsDirIo {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("结果目录中没有图像: {0}")]
  NoImages(PathBuf),
}

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
  #[error("没有已处理的记录可以导出")]
  NothingProcessed,
  #[error("写入导出文件 {path} 失败: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("导出路径无效: {0}")]
  InvalidPath(String),
}

/// 记录存储错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
  #[error("记录索引越界: {index} (共 {len} 条)")]
  IndexOutOfRange { index: usize, len: usize },
}

/// 会话层错误
#[derive(Error, Debug)]
pub enum ValidatorError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("导出错误: {0}")]
  Export(#[from] ExportError),
  #[error("记录错误: {0}")]
  Record(#[from] RecordError),
}
