// src/model/placements.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 广告位媒体类型
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Banner => "banner",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 宿主拍卖系统中的单个广告位
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdUnit {
    /// 广告位代码，与 imp.id 一一对应
    pub code: String,
    /// 对外暴露的出价 ID
    #[serde(default)]
    pub bid_id: String,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
    /// 适配器自定义参数（原样 JSON，合并时才解析）
    #[serde(default)]
    pub params: Value,
}

/// 每次调用时记录的调试信息
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidderDebug {
    pub request_uri: String,
    pub request_body: String,
    pub status_code: Option<u16>,
    pub response_body: String,
}

/// 参与本次拍卖的出价方及其广告位
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bidder {
    pub bidder_code: String,
    #[serde(default)]
    pub ad_units: Vec<AdUnit>,
    #[serde(default, skip_deserializing)]
    pub debug: Vec<BidderDebug>,
}

impl Bidder {
    pub fn new(bidder_code: &str, ad_units: Vec<AdUnit>) -> Self {
        Self {
            bidder_code: bidder_code.to_string(),
            ad_units,
            debug: Vec::new(),
        }
    }

    /// 根据广告位代码查找对外的出价 ID；未知代码或空 ID 均返回 None
    pub fn lookup_bid_id(&self, code: &str) -> Option<&str> {
        self.ad_units
            .iter()
            .find(|unit| unit.code == code)
            .map(|unit| unit.bid_id.as_str())
            .filter(|id| !id.is_empty())
    }
}
