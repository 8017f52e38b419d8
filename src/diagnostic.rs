// 该文件是 Shanan （山南西风） 项目的一部分。
// src/diagnostic.rs - 标签读取诊断信息
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

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
  /// 标签文件存在但无法读取
  ReadFailure,
  /// 标签文件内容无法解析
  ParseFailure,
}

/// 单个标签文件降级为空检测结果时产生的诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub path: PathBuf,
  pub kind: DiagnosticKind,
  pub message: String,
}

impl Diagnostic {
  pub fn read_failure(path: PathBuf, err: &std::io::Error) -> Self {
    Diagnostic {
      path,
      kind: DiagnosticKind::ReadFailure,
      message: err.to_string(),
    }
  }

  pub fn parse_failure(path: PathBuf, message: impl Into<String>) -> Self {
    Diagnostic {
      path,
      kind: DiagnosticKind::ParseFailure,
      message: message.into(),
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.kind {
      DiagnosticKind::ReadFailure => "读取失败",
      DiagnosticKind::ParseFailure => "解析失败",
    };
    write!(f, "标签文件{} {}: {}", kind, self.path.display(), self.message)
  }
}

pub trait DiagnosticSink {
  fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
  fn report(&self, diagnostic: Diagnostic) {
    (**self).report(diagnostic)
  }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::rc::Rc<S> {
  fn report(&self, diagnostic: Diagnostic) {
    (**self).report(diagnostic)
  }
}

/// 通过 tracing 输出警告
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn report(&self, diagnostic: Diagnostic) {
    warn!("{}，按空检测结果处理", diagnostic);
  }
}

/// 在内存中保留全部诊断
#[derive(Debug, Default)]
pub struct MemorySink {
  entries: RefCell<Vec<Diagnostic>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }

  pub fn entries(&self) -> Vec<Diagnostic> {
    self.entries.borrow().clone()
  }

  pub fn take(&self) -> Vec<Diagnostic> {
    self.entries.take()
  }
}

impl DiagnosticSink for MemorySink {
  fn report(&self, diagnostic: Diagnostic) {
    self.entries.borrow_mut().push(diagnostic);
  }
}
