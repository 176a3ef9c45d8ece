// src/main.rs

use clap::Parser;
use futures::future::join_all;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use conversant_adapter::config::AdapterConfig;
use conversant_adapter::logging::{self, CallLogger};
use conversant_adapter::mock_endpoint::{self, MockMode};
use conversant_adapter::model::context::CallContext;
use conversant_adapter::model::placements::Bidder;
use conversant_adapter::openrtb::request::BidRequest;
use conversant_adapter::ConversantAdapter;

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "Run an OpenRTB bidder adapter call")]
struct CliArgs {
    /// 拍卖输入文件：{ "request": BidRequest, "bidder": Bidder }
    #[arg(short, long, default_value = "static/auction.json")]
    auction: String,
    /// 适配器配置文件；不指定时使用下面的命令行参数
    #[arg(short, long)]
    config: Option<String>,
    #[arg(long, default_value = "http://127.0.0.1:9001/bid")]
    endpoint: String,
    #[arg(long, default_value = "")]
    usersync_url: String,
    #[arg(long, default_value = "http://localhost:8000")]
    external_url: String,
    /// 单次调用超时（毫秒）
    #[arg(long, default_value_t = 200)]
    timeout_ms: u64,
    /// 并发调用次数（共享同一个适配器实例）
    #[arg(long, default_value_t = 1)]
    repeat: usize,
    #[arg(long)]
    debug: bool,
    /// 启动本地模拟竞价端点并把请求发给它
    #[arg(long)]
    mock: bool,
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

#[derive(Deserialize, Debug)]
struct AuctionInput {
    request: BidRequest,
    bidder: Bidder,
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let _guard = logging::init_tracing(&args.log_dir, "adapter_log.json")
        .expect("Unable to set global tracing subscriber");

    let mut config = match &args.config {
        Some(path) => AdapterConfig::from_file(path).expect("Unable to load adapter config"),
        None => {
            let mut config = AdapterConfig::new(&args.endpoint, &args.usersync_url, &args.external_url);
            config.http.timeout_ms = args.timeout_ms;
            config
        }
    };

    if args.mock {
        let endpoint = mock_endpoint::spawn(MockMode::Auction)
            .await
            .expect("Unable to start mock endpoint");
        config.endpoint = endpoint.url();
    }

    let auction_str = fs::read_to_string(&args.auction).expect("Unable to read auction file");
    let mut input: AuctionInput =
        serde_json::from_str(&auction_str).expect("Unable to parse auction file");
    if input.request.id.is_empty() {
        input.request.id = uuid::Uuid::new_v4().to_string();
    }

    let call_logger = CallLogger::new(&args.log_dir, "bidder_calls.json", 1000, 100, 1000);
    let adapter = Arc::new(
        ConversantAdapter::new(&config)
            .expect("Unable to build adapter")
            .with_call_logger(call_logger.clone()),
    );
    info!(
        adapter = adapter.name(),
        endpoint = adapter.uri(),
        usersync = %adapter.usersync_info().url,
        "adapter ready"
    );

    let timeout = Duration::from_millis(config.http.timeout_ms);
    let calls = (0..args.repeat.max(1)).map(|i| {
        let adapter = adapter.clone();
        let request = input.request.clone();
        let mut bidder = input.bidder.clone();
        let ctx = CallContext::new(&format!("{}-{}", request.id, i))
            .with_debug(args.debug)
            .with_timeout(timeout);
        async move {
            let result = adapter.call(&ctx, request, &mut bidder).await;
            (ctx.request_id, result, bidder.debug)
        }
    });

    for (request_id, result, debug) in join_all(calls).await {
        match result {
            Ok(bids) => {
                let out = serde_json::to_string_pretty(&bids).unwrap_or_default();
                println!("[{}] {} bid(s)\n{}", request_id, bids.len(), out);
            }
            Err(e) => eprintln!("[{}] call failed: {}", request_id, e),
        }
        for entry in debug {
            println!(
                "[{}] debug: {}",
                request_id,
                serde_json::to_string_pretty(&entry).unwrap_or_default()
            );
        }
    }

    call_logger.flush().await;
}
