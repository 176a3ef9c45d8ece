// src/model/params.rs

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::flex_bool::FlexBool;

/// **广告位自定义参数**
///
/// 每个字段都是可选的：缺省或 `null` 表示不覆盖请求里的对应字段。
/// 例外是 bidfloor 与 tag_id，它们总是写回 imp（缺省即 0 / 空串）。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PlacementParams {
    #[serde(deserialize_with = "null_as_default")]
    pub site_id: String,
    pub secure: Option<FlexBool>,
    #[serde(deserialize_with = "null_as_default")]
    pub tag_id: String,
    pub position: Option<i8>,
    #[serde(deserialize_with = "null_as_default")]
    pub bidfloor: f64,
    pub mobile: Option<FlexBool>,
    // 以下仅对 video 广告位生效
    #[serde(deserialize_with = "null_as_default")]
    pub mimes: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub api: Vec<i8>,
    #[serde(deserialize_with = "null_as_default")]
    pub protocols: Vec<i8>,
    pub maxduration: Option<i64>,
}

/// 显式的 `null` 与字段缺省同义
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_block() {
        let params: PlacementParams = serde_json::from_value(json!({
            "site_id": "108060",
            "secure": 1,
            "tag_id": "top-banner",
            "position": 3,
            "bidfloor": 0.25,
            "mobile": false,
            "mimes": ["video/mp4"],
            "api": [1, 2],
            "protocols": [2, 5],
            "maxduration": 30
        }))
        .unwrap();
        assert_eq!(params.site_id, "108060");
        assert_eq!(params.secure, Some(FlexBool(true)));
        assert_eq!(params.mobile, Some(FlexBool(false)));
        assert_eq!(params.position, Some(3));
        assert_eq!(params.api, vec![1, 2]);
        assert_eq!(params.maxduration, Some(30));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let params: PlacementParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params, PlacementParams::default());
    }

    #[test]
    fn explicit_nulls_take_defaults() {
        let params: PlacementParams = serde_json::from_value(json!({
            "site_id": null,
            "secure": null,
            "tag_id": null,
            "position": null,
            "bidfloor": null,
            "mobile": null,
            "mimes": null,
            "api": null,
            "protocols": null,
            "maxduration": null
        }))
        .unwrap();
        assert_eq!(params, PlacementParams::default());
    }

    #[test]
    fn out_of_range_list_entries_are_errors() {
        assert!(serde_json::from_value::<PlacementParams>(json!({"api": [300]})).is_err());
        assert!(serde_json::from_value::<PlacementParams>(json!({"mobile": "yes"})).is_err());
    }
}
