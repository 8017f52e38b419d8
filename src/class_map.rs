// 该文件是 Shanan （山南西风） 项目的一部分。
// src/class_map.rs - 类别描述文件解析
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

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::ConfigError;

/// 类别编号，标签文件中可能出现负数
pub type ClassId = i64;

const SPLIT_FIELDS: [&str; 3] = ["train", "val", "test"];

/// 类别编号到名称的映射，加载后不可变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
  names: BTreeMap<ClassId, String>,
}

impl ClassMap {
  /// 按顺序构造，编号从 0 开始连续分配
  pub fn from_names<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    names
      .into_iter()
      .zip(0..)
      .map(|(name, id)| (id, name.into()))
      .collect()
  }

  pub fn get(&self, id: ClassId) -> Option<&str> {
    self.names.get(&id).map(String::as_str)
  }

  /// 未知编号显示为 `Unknown (<id>)`
  pub fn name_or_unknown(&self, id: ClassId) -> String {
    match self.get(id) {
      Some(name) => name.to_string(),
      None => format!("Unknown ({})", id),
    }
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
    self.names.iter().map(|(id, name)| (*id, name.as_str()))
  }

  /// 去重并排序后的全部类别名称，作为导出列的顺序
  pub fn sorted_names(&self) -> Vec<&str> {
    self
      .names
      .values()
      .map(String::as_str)
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }
}

impl FromIterator<(ClassId, String)> for ClassMap {
  fn from_iter<T: IntoIterator<Item = (ClassId, String)>>(iter: T) -> Self {
    ClassMap {
      names: iter.into_iter().collect(),
    }
  }
}

/// `names` 字段的两种编码，加载时统一转换为 `ClassMap`
enum ClassNames {
  Sequence(Vec<Value>),
  Mapping(Mapping),
}

impl ClassNames {
  fn from_value(value: Value) -> Result<Self, ConfigError> {
    match value {
      Value::Sequence(items) => Ok(ClassNames::Sequence(items)),
      Value::Mapping(mapping) => Ok(ClassNames::Mapping(mapping)),
      Value::Tagged(tagged) => ClassNames::from_value(tagged.value),
      other => Err(ConfigError::UnsupportedNames(describe(&other))),
    }
  }

  fn into_class_map(self) -> Result<ClassMap, ConfigError> {
    match self {
      ClassNames::Sequence(items) => items
        .iter()
        .enumerate()
        .map(|(index, item)| -> Result<_, ConfigError> {
          let id = ClassId::try_from(index)
            .map_err(|_| ConfigError::InvalidClassId(index.to_string()))?;
          Ok((id, class_name(&id.to_string(), item)?))
        })
        .collect(),
      ClassNames::Mapping(mapping) => mapping
        .iter()
        .map(|(key, value)| -> Result<_, ConfigError> {
          let id = class_id(key)?;
          Ok((id, class_name(&id.to_string(), value)?))
        })
        .collect(),
    }
  }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
  names: Option<Value>,
  nc: Option<Value>,
  path: Option<Value>,
  train: Option<Value>,
  val: Option<Value>,
  test: Option<Value>,
}

impl RawDescriptor {
  fn split(&self, name: &str) -> Option<&Value> {
    match name {
      "train" => self.train.as_ref(),
      "val" => self.val.as_ref(),
      "test" => self.test.as_ref(),
      _ => None,
    }
  }
}

/// 数据集描述文件（Ultralytics `data.yaml`）
#[derive(Debug, Clone)]
pub struct DataDescriptor {
  class_map: ClassMap,
  declared_count: u32,
  dataset_root: Option<String>,
  splits: BTreeMap<String, String>,
}

impl DataDescriptor {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
      return Err(ConfigError::DescriptorNotFound(path.to_path_buf()));
    }

    info!("加载类别描述文件: {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::DescriptorIo {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_yaml_str(&text)
  }

  pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
    if text.trim().is_empty() {
      return Err(ConfigError::NotAMapping);
    }
    let document: Value = serde_yaml::from_str(text)?;
    if !document.is_mapping() {
      return Err(ConfigError::NotAMapping);
    }
    let raw: RawDescriptor = serde_yaml::from_value(document)?;

    let names = raw.names.clone().ok_or(ConfigError::MissingField("names"))?;
    let nc = raw.nc.as_ref().ok_or(ConfigError::MissingField("nc"))?;

    let class_map = ClassNames::from_value(names)?.into_class_map()?;
    let declared_count = integer_like(nc)
      .and_then(|n| u32::try_from(n).ok())
      .ok_or_else(|| ConfigError::InvalidClassCount(describe(nc)))?;

    // nc 与 names 数量不一致时不做校验
    if declared_count as usize != class_map.len() {
      debug!(
        "nc = {} 与类别名称数量 {} 不一致",
        declared_count,
        class_map.len()
      );
    }

    let dataset_root = raw.path.as_ref().and_then(Value::as_str).map(str::to_string);
    let mut splits = BTreeMap::new();
    for name in SPLIT_FIELDS {
      match raw.split(name) {
        Some(Value::String(value)) => {
          splits.insert(name.to_string(), value.clone());
        }
        Some(other) => debug!("忽略非字符串的 '{}' 字段: {}", name, describe(other)),
        None => {}
      }
    }

    info!("类别描述加载完成，共 {} 个类别", class_map.len());
    Ok(DataDescriptor {
      class_map,
      declared_count,
      dataset_root,
      splits,
    })
  }

  pub fn class_map(&self) -> &ClassMap {
    &self.class_map
  }

  pub fn into_class_map(self) -> ClassMap {
    self.class_map
  }

  /// 描述文件中声明的 `nc`，不保证与类别数量一致
  pub fn declared_count(&self) -> u32 {
    self.declared_count
  }

  pub fn dataset_root(&self) -> Option<&str> {
    self.dataset_root.as_deref()
  }

  pub fn split(&self, name: &str) -> Option<&str> {
    self.splits.get(name).map(String::as_str)
  }

  pub fn splits(&self) -> &BTreeMap<String, String> {
    &self.splits
  }
}

/// 从描述文件加载类别映射
pub fn load_class_map<P: AsRef<Path>>(path: P) -> Result<ClassMap, ConfigError> {
  DataDescriptor::load(path).map(DataDescriptor::into_class_map)
}

fn integer_like(value: &Value) -> Option<i64> {
  match value {
    Value::Number(number) => number.as_i64().or_else(|| {
      number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
    }),
    Value::String(text) => text.trim().parse().ok(),
    Value::Tagged(tagged) => integer_like(&tagged.value),
    _ => None,
  }
}

fn class_id(value: &Value) -> Result<ClassId, ConfigError> {
  integer_like(value).ok_or_else(|| ConfigError::InvalidClassId(describe(value)))
}

fn class_name(id: &str, value: &Value) -> Result<String, ConfigError> {
  match value {
    Value::String(text) => Ok(text.clone()),
    Value::Number(number) => Ok(number.to_string()),
    Value::Bool(true) => Ok("True".to_string()),
    Value::Bool(false) => Ok("False".to_string()),
    Value::Null => Ok("None".to_string()),
    Value::Tagged(tagged) => class_name(id, &tagged.value),
    other => Err(ConfigError::InvalidClassName {
      id: id.to_string(),
      detail: describe(other),
    }),
  }
}

fn describe(value: &Value) -> String {
  match value {
    Value::Null => "null".to_string(),
    Value::Bool(flag) => flag.to_string(),
    Value::Number(number) => number.to_string(),
    Value::String(text) => format!("'{}'", text),
    Value::Sequence(_) => "sequence".to_string(),
    Value::Mapping(_) => "mapping".to_string(),
    Value::Tagged(tagged) => format!("{} {}", tagged.tag, describe(&tagged.value)),
  }
}
