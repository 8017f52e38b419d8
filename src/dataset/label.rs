// 该文件是 Shanan （山南西风） 项目的一部分。
// src/dataset/label.rs - YOLO 标签文件解析
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

use thiserror::Error;

use crate::class_map::ClassId;

// class_id cx cy w h
const MIN_FIELDS: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LabelParseError {
  #[error("第 {line} 行类别编号无效: '{value}'")]
  InvalidClassId { line: usize, value: String },
  #[error("第 {line} 行坐标无效: '{value}'")]
  InvalidCoordinate { line: usize, value: String },
}

/// 单个检测框，坐标为归一化的中心点与宽高
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
  pub class_id: ClassId,
  pub center_x: f32,
  pub center_y: f32,
  pub width: f32,
  pub height: f32,
}

/// 带类别名称的检测框
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
  pub class_name: String,
  pub detection: Detection,
}

/// 非空且字段数足够的行，行号从 1 开始
fn label_lines(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
  content
    .lines()
    .enumerate()
    .map(|(index, line)| (index + 1, line.split_whitespace().collect::<Vec<_>>()))
    .filter(|(_, fields)| fields.len() >= MIN_FIELDS)
}

fn class_id(line: usize, field: &str) -> Result<ClassId, LabelParseError> {
  field.parse().map_err(|_| LabelParseError::InvalidClassId {
    line,
    value: field.to_string(),
  })
}

fn coordinate(line: usize, field: &str) -> Result<f32, LabelParseError> {
  field.parse().map_err(|_| LabelParseError::InvalidCoordinate {
    line,
    value: field.to_string(),
  })
}

/// 只解析类别编号，坐标字段不做检查
pub fn parse_class_ids(content: &str) -> Result<Vec<ClassId>, LabelParseError> {
  label_lines(content)
    .map(|(line, fields)| class_id(line, fields[0]))
    .collect()
}

pub fn parse_detections(content: &str) -> Result<Vec<Detection>, LabelParseError> {
  label_lines(content)
    .map(|(line, fields)| -> Result<_, LabelParseError> {
      Ok(Detection {
        class_id: class_id(line, fields[0])?,
        center_x: coordinate(line, fields[1])?,
        center_y: coordinate(line, fields[2])?,
        width: coordinate(line, fields[3])?,
        height: coordinate(line, fields[4])?,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_and_short_lines_are_skipped() {
    let content = "\n0 0.5 0.5 0.1 0.1\n   \n1 0.2\n2 0.1 0.1 0.3 0.3 0.98\n";
    assert_eq!(parse_class_ids(content).unwrap(), vec![0, 2]);
  }

  #[test]
  fn short_lines_only_yield_nothing() {
    assert!(parse_class_ids("0 0.5\n1\n").unwrap().is_empty());
    assert!(parse_detections("").unwrap().is_empty());
  }

  #[test]
  fn count_only_parse_ignores_coordinates() {
    assert_eq!(parse_class_ids("3 a b c d\n").unwrap(), vec![3]);
    assert_eq!(
      parse_detections("3 a b c d\n").unwrap_err(),
      LabelParseError::InvalidCoordinate {
        line: 1,
        value: "a".to_string()
      }
    );
  }

  #[test]
  fn negative_class_ids_are_counted() {
    let content = "0 .5 .5 .1 .1\n1 .5 .5 .1 .1\n-1 .5 .5 .1 .1\n";
    assert_eq!(parse_class_ids(content).unwrap(), vec![0, 1, -1]);
    assert_eq!(parse_detections(content).unwrap()[2].class_id, -1);
  }

  #[test]
  fn fractional_class_id_is_rejected() {
    assert_eq!(
      parse_class_ids("1.5 .5 .5 .1 .1\n").unwrap_err(),
      LabelParseError::InvalidClassId {
        line: 1,
        value: "1.5".to_string()
      }
    );
  }

  #[test]
  fn invalid_class_id_reports_line() {
    let err = parse_class_ids("0 .5 .5 .1 .1\nx .5 .5 .1 .1\n").unwrap_err();
    assert_eq!(
      err,
      LabelParseError::InvalidClassId {
        line: 2,
        value: "x".to_string()
      }
    );
  }

  #[test]
  fn detailed_parse_keeps_coordinates() {
    let detections = parse_detections("1 0.25 0.75 0.5 0.125\n").unwrap();
    assert_eq!(
      detections,
      vec![Detection {
        class_id: 1,
        center_x: 0.25,
        center_y: 0.75,
        width: 0.5,
        height: 0.125,
      }]
    );
  }
}
