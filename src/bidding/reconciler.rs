// src/bidding/reconciler.rs

use tracing::debug;

use crate::bidding::imp_map::ImpressionMap;
use crate::error::{AdapterError, Result};
use crate::model::bid::BidRecord;
use crate::model::placements::{Bidder, MediaType};
use crate::openrtb::request::{BidRequest, ImpMedia};
use crate::openrtb::response::BidResponse;

/// **把 OpenRTB 响应还原成宿主的出价记录**
///
/// 价格 <= 0 的 bid 视为不出价直接丢弃；
/// 任何 bid 指向未知 imp 或未知广告位，整批响应作废。
/// 返回空列表表示不出价。
pub fn reconcile(
    response: BidResponse,
    request: &BidRequest,
    imps: &ImpressionMap,
    bidder: &Bidder,
) -> Result<Vec<BidRecord>> {
    let mut bids = Vec::new();

    for seatbid in response.seatbid {
        for bid in seatbid.bid {
            if bid.price <= 0.0 {
                debug!(bid_id = %bid.id, impid = %bid.impid, "dropping non-positive bid");
                continue;
            }

            // 返回的每个 bid 都必须对应请求中的 imp
            let imp = imps
                .get(request, &bid.impid)
                .ok_or_else(|| AdapterError::UnknownImpression(bid.impid.clone()))?;

            let bid_id = bidder
                .lookup_bid_id(&bid.impid)
                .ok_or_else(|| AdapterError::UnknownPlacement(bid.impid.clone()))?
                .to_string();

            let record = match &imp.media {
                ImpMedia::Video(video) => BidRecord {
                    bid_id,
                    ad_unit_code: bid.impid,
                    price: bid.price,
                    creative_id: bid.crid.unwrap_or_default(),
                    bidder_code: bidder.bidder_code.clone(),
                    creative_media_type: MediaType::Video,
                    // adm 放进 nurl，宿主会把它当作 VAST URL
                    nurl: bid.adm.unwrap_or_default(),
                    adm: String::new(),
                    width: video.w.unwrap_or_default(),
                    height: video.h.unwrap_or_default(),
                },
                ImpMedia::Banner(_) => BidRecord {
                    bid_id,
                    ad_unit_code: bid.impid,
                    price: bid.price,
                    creative_id: bid.crid.unwrap_or_default(),
                    bidder_code: bidder.bidder_code.clone(),
                    creative_media_type: MediaType::Banner,
                    nurl: bid.nurl.unwrap_or_default(),
                    adm: bid.adm.unwrap_or_default(),
                    width: bid.w.unwrap_or_default(),
                    height: bid.h.unwrap_or_default(),
                },
            };

            bids.push(record);
        }
    }

    Ok(bids)
}
