// src/openrtb/request.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_zero_f64(v: &f64) -> bool {
    *v == 0.0
}

/// OpenRTB BidRequest 结构体（只保留适配器会读写的字段）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidRequest {
    pub id: String,

    /// 广告展示请求列表
    #[serde(default)]
    pub imp: Vec<Imp>,

    /// 网站信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,

    /// 设备信息（发送前保证存在，即使为空对象）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,

    /// 用户信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// 隐私法规信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regs: Option<Regs>,

    // 其它简单字段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmax: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cur: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badv: Vec<String>,
}

/// Imp 表示 imp 数组中的单个广告展示
///
/// banner 与 video 互斥，由 [`ImpMedia`] 在类型层面保证；
/// 序列化时展开成 `"banner": {...}` 或 `"video": {...}`。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Imp {
    pub id: String,

    #[serde(flatten)]
    pub media: ImpMedia,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displaymanager: Option<String>,

    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub bidfloor: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tagid: String,

    /// 1 = 需要 HTTPS 素材
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<i8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

impl Imp {
    pub fn banner(id: &str, banner: Banner) -> Self {
        Self::with_media(id, ImpMedia::Banner(banner))
    }

    pub fn video(id: &str, video: Video) -> Self {
        Self::with_media(id, ImpMedia::Video(video))
    }

    fn with_media(id: &str, media: ImpMedia) -> Self {
        Self {
            id: id.to_string(),
            media,
            displaymanager: None,
            bidfloor: 0.0,
            tagid: String::new(),
            secure: None,
            ext: None,
        }
    }
}

/// 广告展示的媒体对象：banner 或 video，二选一
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ImpMedia {
    #[serde(rename = "banner")]
    Banner(Banner),
    #[serde(rename = "video")]
    Video(Video),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Banner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<Format>,
    /// 广告位在页面上的位置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Format {
    pub w: u64,
    pub h: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Video {
    #[serde(default)]
    pub mimes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minduration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i8>,
    /// 支持的 API 框架（VPAID、MRAID 等）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<i8>,
}

/// 网站信息
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Site {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<i8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyeruid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Regs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coppa: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}
