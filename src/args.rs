// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

/// Shanan 推理结果核对工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 统计标签文件覆盖情况
  Coverage {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
  },
  /// 逐张输出检测结果
  Inspect {
    #[command(flatten)]
    dataset: DatasetArgs,
  },
  /// 提交人工计数并导出
  Review {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// 人工计数表（YAML：图像文件名 -> 类别名称 -> 数量）
    #[arg(long, value_name = "FILE")]
    sheet: Option<PathBuf>,
    /// 计数表中没有的图像也以空人工计数提交
    #[arg(long)]
    all: bool,
    /// 导出目标，可重复
    /// 支持格式:
    /// - 逐图像核对表: table:///path/to/result.csv
    /// - 分类别汇总: summary:///path/to/summary.csv
    #[arg(long, value_name = "OUTPUT", required = true)]
    output: Vec<Url>,
  },
}

#[derive(Args, Debug)]
pub struct DatasetArgs {
  /// 数据集描述文件 (data.yaml)
  #[arg(long, value_name = "FILE")]
  pub data: PathBuf,
  /// 推理结果目录，标签位于其中的 labels/ 子目录
  #[arg(long, value_name = "DIR")]
  pub results: PathBuf,
}
