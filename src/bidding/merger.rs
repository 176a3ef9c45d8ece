// src/bidding/merger.rs

use serde::Deserialize;
use tracing::debug;

use crate::bidding::imp_map::ImpressionMap;
use crate::error::{AdapterError, Result};
use crate::model::params::PlacementParams;
use crate::model::placements::Bidder;
use crate::openrtb::request::{BidRequest, Device, Imp, ImpMedia, Site};

/// 写入每个 imp 的 displaymanager
pub const DISPLAY_MANAGER: &str = "prebid-s2s";

/// **将广告位自定义参数合并进通用 BidRequest**
///
/// - 没有对应 imp 的广告位直接跳过
/// - 参数解析失败则整个调用失败
/// - 合并后仍没有 site id 则整个调用失败
/// - device 缺失时补一个空对象
pub fn merge_params(
    request: &mut BidRequest,
    imps: &ImpressionMap,
    bidder: &Bidder,
) -> Result<()> {
    for unit in &bidder.ad_units {
        if !imps.contains(&unit.code) {
            debug!(ad_unit = %unit.code, "no impression for ad unit, skipping");
            continue;
        }

        // params 为 null 等同于空参数块
        let params = Option::<PlacementParams>::deserialize(&unit.params)
            .map_err(|source| AdapterError::Decode {
                code: unit.code.clone(),
                source,
            })?
            .unwrap_or_default();

        apply_site_params(request, &params);

        if let Some(imp) = imps.get_mut(request, &unit.code) {
            apply_imp_params(imp, &params);
        }
    }

    let has_site_id = request.site.as_ref().is_some_and(|site| !site.id.is_empty());
    if !has_site_id {
        return Err(AdapterError::MissingRequiredField("site id"));
    }

    request.device.get_or_insert_with(Device::default);

    Ok(())
}

/// site 级字段，多个广告位之间后写覆盖先写
fn apply_site_params(request: &mut BidRequest, params: &PlacementParams) {
    if !params.site_id.is_empty() {
        request.site.get_or_insert_with(Site::default).id = params.site_id.clone();
    }
    if let Some(mobile) = params.mobile {
        request.site.get_or_insert_with(Site::default).mobile = Some(mobile.to_i8());
    }
}

fn apply_imp_params(imp: &mut Imp, params: &PlacementParams) {
    imp.displaymanager = Some(DISPLAY_MANAGER.to_string());
    imp.bidfloor = params.bidfloor;
    imp.tagid = params.tag_id.clone();

    match &mut imp.media {
        ImpMedia::Banner(banner) => {
            if let Some(pos) = params.position {
                banner.pos = Some(pos);
            }
        }
        ImpMedia::Video(video) => {
            if let Some(pos) = params.position {
                video.pos = Some(pos);
            }
            // 自定义参数中的列表会整体替换广告位 video 对象里的同名字段
            if !params.api.is_empty() {
                video.api = params.api.clone();
            }
            if !params.protocols.is_empty() {
                video.protocols = params.protocols.clone();
            }
            if !params.mimes.is_empty() {
                video.mimes = params.mimes.clone();
            }
            if let Some(maxduration) = params.maxduration {
                video.maxduration = Some(maxduration);
            }
        }
    }

    // 不要覆盖已经开启的全局 secure 标记
    let already_secure = imp.secure.is_some_and(|secure| secure != 0);
    if !already_secure {
        if let Some(secure) = params.secure {
            imp.secure = Some(secure.to_i8());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::placements::{AdUnit, MediaType};
    use crate::openrtb::request::{Banner, Video};
    use serde_json::{json, Value};

    fn unit(code: &str, params: Value) -> AdUnit {
        AdUnit {
            code: code.to_string(),
            bid_id: format!("bid-{}", code),
            media_types: vec![MediaType::Banner, MediaType::Video],
            params,
        }
    }

    fn request() -> BidRequest {
        BidRequest {
            id: "req-1".to_string(),
            imp: vec![
                Imp::banner(
                    "banner-1",
                    Banner {
                        w: Some(300),
                        h: Some(250),
                        ..Default::default()
                    },
                ),
                Imp::video(
                    "video-1",
                    Video {
                        mimes: vec!["video/webm".to_string()],
                        protocols: vec![1],
                        w: Some(640),
                        h: Some(480),
                        ..Default::default()
                    },
                ),
            ],
            site: Some(Site::default()),
            ..Default::default()
        }
    }

    fn merge(request: &mut BidRequest, units: Vec<AdUnit>) -> Result<()> {
        let imps = ImpressionMap::build(request);
        merge_params(request, &imps, &Bidder::new("conversant", units))
    }

    fn video(request: &BidRequest) -> &Video {
        match &request.imp[1].media {
            ImpMedia::Video(video) => video,
            ImpMedia::Banner(_) => panic!("expected video"),
        }
    }

    fn banner(request: &BidRequest) -> &Banner {
        match &request.imp[0].media {
            ImpMedia::Banner(banner) => banner,
            ImpMedia::Video(_) => panic!("expected banner"),
        }
    }

    #[test]
    fn fills_site_and_impression_fields() {
        let mut req = request();
        merge(
            &mut req,
            vec![unit(
                "banner-1",
                json!({"site_id": "108060", "tag_id": "top", "bidfloor": 0.5, "position": 1, "mobile": 1}),
            )],
        )
        .unwrap();

        let site = req.site.as_ref().unwrap();
        assert_eq!(site.id, "108060");
        assert_eq!(site.mobile, Some(1));
        let imp = &req.imp[0];
        assert_eq!(imp.displaymanager.as_deref(), Some(DISPLAY_MANAGER));
        assert_eq!(imp.tagid, "top");
        assert_eq!(imp.bidfloor, 0.5);
        assert_eq!(banner(&req).pos, Some(1));
        assert_eq!(req.device, Some(Device::default()));
    }

    #[test]
    fn video_lists_replace_existing_values() {
        let mut req = request();
        merge(
            &mut req,
            vec![unit(
                "video-1",
                json!({
                    "site_id": "1",
                    "position": 7,
                    "api": [1, 2],
                    "protocols": [2, 5],
                    "mimes": ["video/mp4"],
                    "maxduration": 30
                }),
            )],
        )
        .unwrap();
        let video = video(&req);
        assert_eq!(video.pos, Some(7));
        assert_eq!(video.api, vec![1, 2]);
        assert_eq!(video.protocols, vec![2, 5]);
        assert_eq!(video.mimes, vec!["video/mp4".to_string()]);
        assert_eq!(video.maxduration, Some(30));
    }

    #[test]
    fn empty_video_lists_keep_existing_values() {
        let mut req = request();
        merge(&mut req, vec![unit("video-1", json!({"site_id": "1", "mimes": []}))]).unwrap();
        let video = video(&req);
        assert_eq!(video.mimes, vec!["video/webm".to_string()]);
        assert_eq!(video.protocols, vec![1]);
        assert_eq!(video.maxduration, None);
        assert_eq!(video.pos, None);
    }

    #[test]
    fn video_only_params_do_not_touch_banners() {
        let mut req = request();
        let before = banner(&req).clone();
        merge(
            &mut req,
            vec![unit("banner-1", json!({"site_id": "1", "mimes": ["video/mp4"], "api": [3]}))],
        )
        .unwrap();
        assert_eq!(banner(&req), &before);
    }

    #[test]
    fn secure_flag_already_on_is_never_overridden() {
        let mut req = request();
        req.imp[0].secure = Some(1);
        merge(&mut req, vec![unit("banner-1", json!({"site_id": "1", "secure": 0}))]).unwrap();
        assert_eq!(req.imp[0].secure, Some(1));
    }

    #[test]
    fn secure_flag_is_set_when_not_already_on() {
        let mut req = request();
        req.imp[1].secure = Some(0);
        merge(
            &mut req,
            vec![
                unit("banner-1", json!({"site_id": "1", "secure": true})),
                unit("video-1", json!({"secure": 1})),
            ],
        )
        .unwrap();
        assert_eq!(req.imp[0].secure, Some(1));
        assert_eq!(req.imp[1].secure, Some(1));
    }

    #[test]
    fn units_without_impressions_are_skipped() {
        let mut req = request();
        let before = req.imp.clone();
        // 参数本身非法也不会被解析
        merge(
            &mut req,
            vec![
                unit("missing", json!({"mobile": "not-a-flag"})),
                unit("banner-1", json!({"site_id": "1"})),
            ],
        )
        .unwrap();
        assert_eq!(req.imp.len(), before.len());
        assert_eq!(req.imp[1], before[1]);
    }

    #[test]
    fn later_units_win_on_site_fields() {
        let mut req = request();
        merge(
            &mut req,
            vec![
                unit("banner-1", json!({"site_id": "first", "mobile": true})),
                unit("video-1", json!({"site_id": "second", "mobile": 0})),
            ],
        )
        .unwrap();
        let site = req.site.as_ref().unwrap();
        assert_eq!(site.id, "second");
        assert_eq!(site.mobile, Some(0));
    }

    #[test]
    fn missing_site_id_fails() {
        let mut req = request();
        let err = merge(&mut req, vec![unit("banner-1", json!({"tag_id": "x"}))]).unwrap_err();
        assert!(matches!(err, AdapterError::MissingRequiredField(_)));

        let mut req = request();
        req.site = None;
        let err = merge(&mut req, vec![]).unwrap_err();
        assert!(matches!(err, AdapterError::MissingRequiredField(_)));
    }

    #[test]
    fn site_id_from_base_request_is_enough() {
        let mut req = request();
        req.site = Some(Site {
            id: "base".to_string(),
            ..Default::default()
        });
        merge(&mut req, vec![unit("banner-1", json!({}))]).unwrap();
        assert_eq!(req.site.unwrap().id, "base");
    }

    #[test]
    fn null_params_are_treated_as_absent() {
        let mut req = request();
        req.site = Some(Site {
            id: "base".to_string(),
            ..Default::default()
        });
        let before = video(&req).clone();
        merge(
            &mut req,
            vec![
                unit("banner-1", json!({"site_id": null, "bidfloor": null, "tag_id": null})),
                unit("video-1", json!({"mimes": null, "api": null, "protocols": null})),
            ],
        )
        .unwrap();
        assert_eq!(req.site.as_ref().unwrap().id, "base");
        assert_eq!(req.imp[0].bidfloor, 0.0);
        assert_eq!(req.imp[0].tagid, "");
        assert_eq!(video(&req), &before);

        let mut req = request();
        req.site = Some(Site {
            id: "base".to_string(),
            ..Default::default()
        });
        merge(&mut req, vec![unit("banner-1", Value::Null)]).unwrap();
        assert_eq!(req.imp[0].displaymanager.as_deref(), Some(DISPLAY_MANAGER));
        assert_eq!(req.site.unwrap().id, "base");
    }

    #[test]
    fn malformed_params_abort_the_merge() {
        let mut req = request();
        let err = merge(&mut req, vec![unit("banner-1", json!({"secure": "yes"}))]).unwrap_err();
        match err {
            AdapterError::Decode { code, .. } => assert_eq!(code, "banner-1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn repeated_merge_overwrites_scalars_identically() {
        let mut req = request();
        let units = vec![unit("banner-1", json!({"site_id": "1", "tag_id": "t", "bidfloor": 1.25}))];
        merge(&mut req, units.clone()).unwrap();
        let once = req.clone();
        merge(&mut req, units).unwrap();
        assert_eq!(req, once);
    }
}
