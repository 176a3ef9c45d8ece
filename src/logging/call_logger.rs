// src/logging/call_logger.rs

use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task;
use tokio::time::{self, Duration};
use tracing::warn;
use tracing_appender::rolling;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;

use crate::logging::call_summary::CallSummary;

enum Command {
    Entry(String),
    Flush(oneshot::Sender<()>),
}

/// 调用汇总日志记录器
///
/// 日志先进入 mpsc 通道，由后台任务按条数或定时批量写入按小时滚动的文件。
/// 只持有发送端，可以在并发调用之间共享。
pub struct CallLogger {
    sender: Sender<Command>,
}

impl CallLogger {
    /// - `log_dir`: 日志文件存放目录
    /// - `file_name`: 文件名前缀，例如 "bidder_calls.json"
    /// - `buffer_size`: mpsc 通道缓冲区大小
    /// - `batch_size`: 累计多少条写一次盘
    /// - `flush_interval`: 定时刷盘间隔（毫秒）
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn new(
        log_dir: &str,
        file_name: &str,
        buffer_size: usize,
        batch_size: usize,
        flush_interval: u64,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let appender = Arc::new(rolling::hourly(log_dir, file_name));
        tokio::spawn(Self::background_log_writer(
            appender,
            receiver,
            batch_size.max(1),
            flush_interval.max(1),
        ));
        Arc::new(Self { sender })
    }

    /// 记录一条调用汇总
    pub async fn log(&self, summary: &CallSummary) {
        let line = json!({
            "level": summary.level(),
            "summary": summary,
        })
        .to_string();
        if self.sender.send(Command::Entry(line)).await.is_err() {
            warn!("call logger writer is gone, dropping summary");
        }
    }

    /// 等待缓冲区中的日志全部写盘
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(Command::Flush(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    async fn background_log_writer(
        appender: Arc<RollingFileAppender>,
        mut receiver: Receiver<Command>,
        batch_size: usize,
        flush_interval: u64,
    ) {
        let mut buffer: Vec<String> = Vec::new();
        let mut interval = time::interval(Duration::from_millis(flush_interval));
        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(Command::Entry(line)) => {
                        buffer.push(line);
                        if buffer.len() >= batch_size {
                            Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                        }
                    }
                    Some(Command::Flush(done)) => {
                        Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                        let _ = done.send(());
                    }
                    None => {
                        // 所有发送端都已释放
                        Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                        break;
                    }
                },
                _ = interval.tick() => {
                    Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                }
            }
        }
    }

    async fn write_logs_to_disk(file: Arc<RollingFileAppender>, buffer: &mut Vec<String>) {
        if buffer.is_empty() {
            return;
        }
        let content = buffer.join("\n") + "\n";
        buffer.clear();
        let result = task::spawn_blocking(move || {
            let mut writer = file.make_writer();
            writer.write_all(content.as_bytes())
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to write call logs: {}", e),
            Err(e) => warn!("Call log writer task failed: {}", e),
        }
    }
}
