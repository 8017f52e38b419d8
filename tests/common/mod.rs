// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/common/mod.rs - 测试辅助函数
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

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use shanan_validator::ClassCounts;
use tempfile::TempDir;

/// 临时推理结果目录，删除时自动清理
pub struct Fixture {
  dir: TempDir,
}

impl Fixture {
  pub fn new() -> Self {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    std::fs::create_dir(dir.path().join("results")).expect("Failed to create results dir");
    Fixture { dir }
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn results(&self) -> PathBuf {
    self.dir.path().join("results")
  }

  /// 写入 data.yaml 并返回其路径
  pub fn descriptor(&self, yaml: &str) -> PathBuf {
    let path = self.dir.path().join("data.yaml");
    std::fs::write(&path, yaml).expect("Failed to write descriptor");
    path
  }

  /// 创建一个空图像文件，`label` 为 `Some` 时同时写入标签文件
  pub fn image(&self, name: &str, label: Option<&str>) -> &Self {
    std::fs::write(self.results().join(name), b"").expect("Failed to write image");
    if let Some(content) = label {
      let labels = self.results().join("labels");
      std::fs::create_dir_all(&labels).expect("Failed to create labels dir");
      let stem = Path::new(name).file_stem().expect("image name without stem");
      std::fs::write(labels.join(stem).with_extension("txt"), content)
        .expect("Failed to write label");
    }
    self
  }

  pub fn output(&self, name: &str) -> PathBuf {
    self.dir.path().join(name)
  }
}

pub fn counts(pairs: &[(&str, u32)]) -> ClassCounts {
  pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn read_lines(path: &Path) -> Vec<String> {
  std::fs::read_to_string(path)
    .expect("Failed to read output")
    .lines()
    .map(str::to_string)
    .collect()
}
