// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 批量核对任务
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

use tracing::{debug, info, warn};

use crate::{
  dataset::DetectionView, diagnostic::DiagnosticSink, session::Session, sheet::ManualSheet,
};

pub trait Task<S>: Sized {
  type Error;
  fn run_task(self, session: &mut Session<S>) -> Result<(), Self::Error>;
}

/// 逐张输出检测结果，不提交记录
pub struct InspectTask;

impl<S: DiagnosticSink> Task<S> for InspectTask {
  type Error = anyhow::Error;

  fn run_task(self, session: &mut Session<S>) -> Result<(), Self::Error> {
    info!("开始检查 {} 张图像...", session.images().len());
    for index in 0..session.images().len() {
      session.go_to(index)?;
      // 标签文件只读取一次，视图与检测框列表共用
      let label = session.label(index)?;
      let view = DetectionView::new(label.class_ids().as_deref(), session.class_map());
      let name = session.current_image().file_name();
      if view.is_warning() {
        warn!("[{}] {}: {}", index, name, view);
      } else {
        info!("[{}] {}: {}", index, name, view);
      }

      for d in label.detections() {
        debug!(
          "  - {}: ({:.4}, {:.4}, {:.4}x{:.4})",
          session.class_map().name_or_unknown(d.class_id),
          d.center_x,
          d.center_y,
          d.width,
          d.height
        );
      }
    }
    info!("检查完成");
    Ok(())
  }
}

/// 按人工计数表提交记录
#[derive(Debug, Default)]
pub struct SheetReviewTask {
  sheet: ManualSheet,
  commit_all: bool,
}

impl SheetReviewTask {
  pub fn new(sheet: ManualSheet) -> Self {
    SheetReviewTask {
      sheet,
      commit_all: false,
    }
  }

  /// 计数表中没有的图像也以空人工计数提交
  pub fn with_commit_all(mut self, commit_all: bool) -> Self {
    self.commit_all = commit_all;
    self
  }
}

impl<S: DiagnosticSink> Task<S> for SheetReviewTask {
  type Error = anyhow::Error;

  fn run_task(self, session: &mut Session<S>) -> Result<(), Self::Error> {
    info!("开始提交人工计数...");
    for name in self.sheet.image_names() {
      if !session.images().iter().any(|image| image.file_name() == name) {
        warn!("人工计数表中的图像不在结果目录中: {}", name);
      }
    }

    for index in 0..session.images().len() {
      session.go_to(index)?;
      let manual = match self.sheet.get(session.current_image().file_name()) {
        Some(counts) => counts.clone(),
        None if self.commit_all => Default::default(),
        None => continue,
      };

      for class_name in manual.keys() {
        if !session.class_map().iter().any(|(_, name)| name == class_name) {
          warn!(
            "{}: 类别 '{}' 不在类别映射中，导出时将被忽略",
            session.current_image().file_name(),
            class_name
          );
        }
      }

      session.save_current(manual)?;
      debug!("{}", session.progress());
    }

    info!("提交完成，{}", session.progress());
    Ok(())
  }
}
