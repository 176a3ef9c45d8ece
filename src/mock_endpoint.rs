// src/mock_endpoint.rs

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{serve, Json, Router};
use rand::Rng;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::openrtb::request::{BidRequest, ImpMedia};
use crate::openrtb::response::{Bid, BidResponse, SeatBid};

/// 模拟竞价端点的行为
#[derive(Debug, Clone)]
pub enum MockMode {
    /// 对每个 imp 按底价随机加价出价
    Auction,
    /// 固定状态码与响应体
    Fixed { status: u16, body: String },
    /// 固定状态码与原始字节响应体
    Raw { status: u16, body: Vec<u8> },
    /// 延迟后再按内层模式响应
    Delayed { delay_ms: u64, then: Box<MockMode> },
}

/// 端点收到的一次请求
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: String,
}

struct MockState {
    mode: MockMode,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// 运行中的模拟端点
#[derive(Clone)]
pub struct MockEndpoint {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockEndpoint {
    pub fn url(&self) -> String {
        format!("http://{}/bid", self.addr)
    }

    pub async fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().await.clone()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn handle_bid(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = String::from_utf8_lossy(&body).into_owned();
    state.received.lock().await.push(ReceivedRequest {
        content_type: header_value(&headers, "content-type"),
        accept: header_value(&headers, "accept"),
        body: body.clone(),
    });

    let mut mode = &state.mode;
    while let MockMode::Delayed { delay_ms, then } = mode {
        sleep(Duration::from_millis(*delay_ms)).await;
        mode = then.as_ref();
    }

    match mode {
        MockMode::Fixed { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
        MockMode::Raw { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
        _ => match serde_json::from_str::<BidRequest>(&body) {
            Ok(request) => Json(auction(&request)).into_response(),
            Err(e) => {
                warn!("Mock endpoint received invalid BidRequest: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
        },
    }
}

/// 模拟竞价：根据 imp 类型随机生成出价
/// banner 返回 HTML 素材并回显尺寸；video 返回 VAST 地址
fn auction(request: &BidRequest) -> BidResponse {
    info!(
        "Mock endpoint received BidRequest: id={}, imp_count={}",
        request.id,
        request.imp.len()
    );

    let mut rng = rand::thread_rng();
    let bids = request
        .imp
        .iter()
        .map(|imp| {
            let bid_id = format!("bid-{}", imp.id);
            let floor = if imp.bidfloor > 0.0 { imp.bidfloor } else { 0.1 };
            let (multiplier, adm, nurl, w, h) = match &imp.media {
                ImpMedia::Banner(banner) => (
                    rng.gen_range(1.0..3.0),
                    format!(
                        "<html><body>Mock Banner Ad<img src=\"http://mock-endpoint.local/impression?bid={bid_id}\" style=\"display:none;\" /></body></html>"
                    ),
                    Some(format!("http://mock-endpoint.local/win?bid={bid_id}")),
                    banner.w,
                    banner.h,
                ),
                ImpMedia::Video(_) => (
                    rng.gen_range(1.0..2.5),
                    format!("http://mock-endpoint.local/vast?bid={bid_id}"),
                    None,
                    None,
                    None,
                ),
            };
            Bid {
                id: bid_id,
                impid: imp.id.clone(),
                price: floor * multiplier,
                adm: Some(adm),
                nurl,
                crid: Some(format!("mock-cr-{}", imp.id)),
                w,
                h,
                ..Default::default()
            }
        })
        .collect();

    BidResponse {
        id: request.id.clone(),
        seatbid: vec![SeatBid {
            bid: bids,
            seat: Some("mock_seat".to_string()),
            group: Some(0),
        }],
        bidid: None,
        cur: Some("USD".to_string()),
        nbr: None,
    }
}

/// 在 127.0.0.1 的随机端口启动模拟端点，路由为 `/bid`
pub async fn spawn(mode: MockMode) -> std::io::Result<MockEndpoint> {
    spawn_on("127.0.0.1:0", mode).await
}

pub async fn spawn_on(addr: &str, mode: MockMode) -> std::io::Result<MockEndpoint> {
    let state = Arc::new(MockState {
        mode,
        received: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/bid", post(handle_bid))
        .with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    info!("Mock endpoint running at http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = serve(listener, app).await {
            warn!("Mock endpoint stopped: {}", e);
        }
    });

    Ok(MockEndpoint { addr, state })
}
