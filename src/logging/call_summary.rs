use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::model::bid::BidRecord;

/// **单次适配器调用的汇总日志**
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CallSummary {
    pub timestamp: String,     // 记录时间
    pub log_type: String,      // 固定为 "bidder_call"
    pub request_id: String,    // OpenRTB `BidRequest.id`
    pub bidder_code: String,   // 出价方代码
    pub endpoint: String,      // 竞价端点地址
    pub status: String,        // "success" / "no_bid" / "failure"
    pub bid_count: usize,      // 有效出价数
    pub top_price: f64,        // 最高出价
    pub elapsed_ms: u64,       // 调用耗时
    pub error: Option<String>, // 失败原因
}

impl CallSummary {
    pub fn new(request_id: &str, bidder_code: &str, endpoint: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: "bidder_call".to_string(),
            request_id: request_id.to_string(),
            bidder_code: bidder_code.to_string(),
            endpoint: endpoint.to_string(),
            status: "failure".to_string(), // 默认失败，后续更新
            bid_count: 0,
            top_price: 0.0,
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn record_bids(&mut self, bids: &[BidRecord]) {
        self.bid_count = bids.len();
        self.top_price = bids.iter().map(|b| b.price).fold(0.0, f64::max);
        self.status = if bids.is_empty() { "no_bid" } else { "success" }.to_string();
    }

    pub fn record_error(&mut self, err: &AdapterError) {
        self.status = "failure".to_string();
        self.error = Some(err.to_string());
    }

    pub fn level(&self) -> &'static str {
        if self.error.is_some() {
            "WARN"
        } else {
            "INFO"
        }
    }
}
