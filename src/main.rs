// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use shanan_validator::{
  FromUrl, Session,
  export::ExportWrapper,
  sheet::ManualSheet,
  task::{InspectTask, SheetReviewTask, Task},
};

use args::{Cli, Command, DatasetArgs};

fn open_session(dataset: &DatasetArgs) -> Result<Session> {
  info!("描述文件路径: {}", dataset.data.display());
  info!("结果目录: {}", dataset.results.display());
  Ok(Session::open(&dataset.data, &dataset.results)?)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let cli = Cli::parse();

  match cli.command {
    Command::Coverage { dataset, json } => {
      let session = open_session(&dataset)?;
      let coverage = session.coverage();
      if json {
        println!("{}", serde_json::to_string_pretty(&coverage)?);
      } else {
        println!("{}", coverage);
      }
    }
    Command::Inspect { dataset } => {
      let mut session = open_session(&dataset)?;
      InspectTask.run_task(&mut session)?;
    }
    Command::Review {
      dataset,
      sheet,
      all,
      output,
    } => {
      // 先解析全部导出目标，避免提交后才发现参数错误
      let outputs = output
        .iter()
        .map(ExportWrapper::from_url)
        .collect::<Result<Vec<_>, _>>()?;
      let sheet = match sheet {
        Some(path) => ManualSheet::load(path)?,
        None => ManualSheet::default(),
      };

      let mut session = open_session(&dataset)?;
      SheetReviewTask::new(sheet)
        .with_commit_all(all)
        .run_task(&mut session)?;

      for (url, target) in output.iter().zip(&outputs) {
        let rows = session.export_to(target)?;
        info!("已导出 {} 行: {}", rows, url);
      }
      println!("{}", session.progress());
    }
  }

  Ok(())
}
