// src/model/context.rs

use std::time::{Duration, Instant};
use tokio::sync::watch;

/// 取消信号的发送端，由调用方持有
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

/// **单次调用的上下文**
///
/// 包含调试开关、超时以及可选的取消信号。每次调用都新建，不在调用之间共享。
#[derive(Debug, Clone)]
pub struct CallContext {
    pub request_id: String,
    pub debug: bool,
    pub timeout: Option<Duration>,
    cancel: Option<watch::Receiver<bool>>,
    /// 请求开始时间，用于计算总耗时
    pub start_time: Instant,
}

impl CallContext {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            debug: false,
            timeout: None,
            cancel: None,
            start_time: Instant::now(),
        }
    }

    /// 创建可被外部取消的上下文
    pub fn cancellable(request_id: &str) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut ctx = Self::new(request_id);
        ctx.cancel = Some(receiver);
        (ctx, CancelHandle { sender })
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// 取消信号触发时返回；没有取消信号（或发送端已丢弃）时永远挂起
    pub async fn cancelled(&self) {
        if let Some(rx) = &self.cancel {
            let mut rx = rx.clone();
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_handle_wakes_waiters() {
        let (ctx, handle) = CallContext::cancellable("r1");
        assert!(!ctx.is_cancelled());
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.cancelled().await })
        };
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn plain_context_never_cancels() {
        let ctx = CallContext::new("r2");
        let res = tokio::time::timeout(Duration::from_millis(20), ctx.cancelled()).await;
        assert!(res.is_err());
    }
}
