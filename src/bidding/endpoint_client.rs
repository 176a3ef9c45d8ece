// src/bidding/endpoint_client.rs

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AdapterError, Result};
use crate::model::context::CallContext;
use crate::model::placements::BidderDebug;

/// 竞价端点 HTTP 客户端
///
/// 内部的 reqwest::Client 自带连接池，可以在并发调用之间共享。
#[derive(Debug, Clone)]
pub struct EndpointClient {
    client: Client,
    uri: String,
    default_timeout: Duration,
}

impl EndpointClient {
    pub fn new(client: Client, uri: &str, default_timeout: Duration) -> Self {
        Self {
            client,
            uri: uri.to_string(),
            default_timeout,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// 发送 BidRequest
    ///
    /// 返回 `Ok(None)` 表示 204 不出价，`Ok(Some(body))` 为 200 响应体。
    /// 超时或取消信号先到时，请求被丢弃，不产生任何出价。
    pub async fn post(
        &self,
        body: String,
        ctx: &CallContext,
        debug: Option<&mut BidderDebug>,
    ) -> Result<Option<Vec<u8>>> {
        let deadline = ctx.timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();

        let (status, bytes) = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                warn!(request_id = %ctx.request_id, uri = %self.uri, "bid request cancelled");
                return Err(AdapterError::Cancelled);
            }
            res = timeout(deadline, self.exchange(body)) => match res {
                Ok(exchanged) => exchanged?,
                Err(_) => {
                    warn!(request_id = %ctx.request_id, uri = %self.uri, ?deadline, "bid request timed out");
                    return Err(AdapterError::Timeout(deadline));
                }
            },
        };

        debug!(
            request_id = %ctx.request_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bid endpoint responded"
        );

        if let Some(debug) = debug {
            debug.status_code = Some(status.as_u16());
            debug.response_body = String::from_utf8_lossy(&bytes).into_owned();
        }

        match status {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => Ok(Some(bytes)),
            other => Err(AdapterError::HttpStatus {
                status: other.as_u16(),
                body: bytes,
            }),
        }
    }

    async fn exchange(&self, body: String) -> Result<(StatusCode, Vec<u8>)> {
        let resp = self
            .client
            .post(&self.uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok((status, Vec::new()));
        }
        let bytes = resp.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}
