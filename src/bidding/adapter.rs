// src/bidding/adapter.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::bidding::endpoint_client::EndpointClient;
use crate::bidding::imp_map::ImpressionMap;
use crate::bidding::merger::merge_params;
use crate::bidding::reconciler::reconcile;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::logging::{CallLogger, CallSummary};
use crate::model::bid::BidRecord;
use crate::model::context::CallContext;
use crate::model::placements::{Bidder, BidderDebug};
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::BidResponse;

pub const ADAPTER_NAME: &str = "Conversant";
/// cookie / 用户同步使用的名字，同时也是请求中的 bidder 名
pub const FAMILY_NAME: &str = "conversant";

/// 用户同步信息
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UsersyncInfo {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub support_cors: bool,
}

impl UsersyncInfo {
    /// `<usersync_url><urlencoded(<external_url>/setuid?bidder=conversant&uid=)>`
    pub fn redirect(usersync_url: &str, external_url: &str) -> Self {
        let redirect_uri = format!("{}/setuid?bidder={}&uid=", external_url, FAMILY_NAME);
        Self {
            url: format!("{}{}", usersync_url, query_escape(&redirect_uri)),
            kind: "redirect".to_string(),
            support_cors: false,
        }
    }
}

/// 查询参数转义：只保留字母数字与 `-_.~`，空格写成 `+`
///
/// form-urlencoded 会转义 `~` 而保留 `*`，这里把两者调整回来。
/// 输入中的 `%` 总是被写成 `%25`，所以输出里的 `%7E` 只能来自 `~`。
fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%7E", "~")
        .replace('*', "%2A")
}

/// **OpenRTB 出价方适配器**
///
/// 构造后只读：端点地址、用户同步信息和共享的 HTTP 客户端。
/// 每次调用的 imp 映射、合并后的请求和出价列表都在调用内部创建，
/// 因此同一个实例可以被并发调用。
pub struct ConversantAdapter {
    client: EndpointClient,
    usersync_info: UsersyncInfo,
    call_logger: Option<Arc<CallLogger>>,
}

impl ConversantAdapter {
    pub fn new(config: &AdapterConfig) -> Result<Self> {
        config.validate()?;
        let http = config.http.build_client()?;
        Ok(Self {
            client: EndpointClient::new(http, &config.endpoint, config.http.timeout()),
            usersync_info: UsersyncInfo::redirect(&config.usersync_url, &config.external_url),
            call_logger: None,
        })
    }

    /// 每次调用结束后写一条汇总日志
    pub fn with_call_logger(mut self, logger: Arc<CallLogger>) -> Self {
        self.call_logger = Some(logger);
        self
    }

    pub fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    pub fn family_name(&self) -> &'static str {
        FAMILY_NAME
    }

    pub fn usersync_info(&self) -> &UsersyncInfo {
        &self.usersync_info
    }

    /// 没有同步 cookie 的用户也照常发起请求
    pub fn skip_no_cookies(&self) -> bool {
        false
    }

    pub fn uri(&self) -> &str {
        self.client.uri()
    }

    /// **处理一次竞价调用**
    ///
    /// 合并参数 -> 发送 -> 解析响应。任何一步失败都不返回出价；
    /// 返回空列表表示不出价。开启调试时，请求与响应会追加到 `bidder.debug`。
    pub async fn call(
        &self,
        ctx: &CallContext,
        request: BidRequest,
        bidder: &mut Bidder,
    ) -> Result<Vec<BidRecord>> {
        let result = self.run(ctx, request, bidder).await;

        let mut summary = CallSummary::new(&ctx.request_id, &bidder.bidder_code, self.uri());
        match &result {
            Ok(bids) => {
                summary.record_bids(bids);
                info!(
                    request_id = %ctx.request_id,
                    bidder = %bidder.bidder_code,
                    bids = bids.len(),
                    elapsed_ms = ctx.elapsed_ms(),
                    "bidder call finished"
                );
            }
            Err(e) => {
                summary.record_error(e);
                warn!(
                    request_id = %ctx.request_id,
                    bidder = %bidder.bidder_code,
                    error = %e,
                    elapsed_ms = ctx.elapsed_ms(),
                    "bidder call failed"
                );
            }
        }
        summary.elapsed_ms = ctx.elapsed_ms();
        if let Some(logger) = &self.call_logger {
            logger.log(&summary).await;
        }

        result
    }

    async fn run(
        &self,
        ctx: &CallContext,
        mut request: BidRequest,
        bidder: &mut Bidder,
    ) -> Result<Vec<BidRecord>> {
        // imp 映射同时用于合并参数和解析响应
        let imps = ImpressionMap::build(&request);

        merge_params(&mut request, &imps, bidder)?;

        let body = serde_json::to_string(&request).map_err(AdapterError::Encode)?;

        let mut debug = BidderDebug {
            request_uri: self.uri().to_string(),
            ..Default::default()
        };
        if ctx.debug {
            debug.request_body = body.clone();
        }

        let sent = self
            .client
            .post(body, ctx, ctx.debug.then_some(&mut debug))
            .await;
        if ctx.debug {
            bidder.debug.push(debug);
        }

        let mut raw = match sent? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        let response: BidResponse = simd_json::serde::from_slice(&mut raw)?;

        reconcile(response, &request, &imps, bidder)
    }
}
