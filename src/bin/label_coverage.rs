// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/label_coverage.rs - 标签覆盖检查
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use shanan_validator::{ClassMap, DetectionResolver};

/// 不需要类别描述文件的标签覆盖检查
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理结果目录
  #[arg(long, value_name = "DIR")]
  pub results: PathBuf,
  /// 列出缺少标签文件的图像
  #[arg(long)]
  pub list_missing: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("结果目录: {}", args.results.display());

  let resolver = DetectionResolver::new(&args.results, ClassMap::default())?;
  let images = resolver.enumerate()?;
  let coverage = resolver.coverage_of(&images);

  if args.list_missing {
    for image in images.iter().filter(|image| resolver.label_path(image).is_none()) {
      warn!("缺少标签文件: {}", image.file_name());
    }
  }

  println!("{}", coverage);
  Ok(())
}
