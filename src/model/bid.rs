// src/model/bid.rs

use serde::{Deserialize, Serialize};

use crate::model::placements::MediaType;

/// **返回给宿主拍卖系统的出价记录**
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BidRecord {
    pub bid_id: String,
    pub ad_unit_code: String,
    pub price: f64,
    pub creative_id: String,
    pub bidder_code: String,
    pub creative_media_type: MediaType,
    /// banner 时为 nurl；video 时为 VAST URL
    pub nurl: String,
    /// 内联素材（仅 banner）
    pub adm: String,
    pub width: u64,
    pub height: u64,
}
