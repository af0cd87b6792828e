// src/main.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::post, serve, Router};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use mocktioneer_adapter::api::handlers::handle_openrtb_request;
use mocktioneer_adapter::bidding::engine::run_auction;
use mocktioneer_adapter::bidding::transport::UpstreamClient;
use mocktioneer_adapter::config::ConfigManager;
use mocktioneer_adapter::logging::logger::init_tracing;
use mocktioneer_adapter::mock_upstream::{serve_mock_upstream, AUCTION_PATH};
use mocktioneer_adapter::openrtb::request::BidRequest;
use mocktioneer_adapter::{AppState, MocktioneerAdapter};

#[derive(Parser, Debug)]
#[command(version, about = "Mocktioneer OpenRTB bidder adapter")]
struct CliArgs {
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// 适配器配置文件（JSON）
    #[arg(long, default_value = "static/mocktioneer.json")]
    config: PathBuf,
    /// 覆盖配置中的 endpoint 模板
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动适配器 HTTP 服务，POST /openrtb2/auction
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// 同时在该端口启动 mock 上游，并在未指定 endpoint 时指向它
        #[arg(long)]
        mock_port: Option<u16>,
    },
    /// 只启动 mock 上游
    Mock {
        #[arg(short, long, default_value_t = 9001)]
        port: u16,
    },
    /// 对文件中的 BidRequest 执行一次竞价并打印结果
    Auction {
        #[arg(short, long)]
        request: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let _guard = init_tracing(&args.log_dir)?;

    let mut endpoint = args.endpoint.clone();
    if let Command::Serve { mock_port: Some(mock_port), .. } = &args.command {
        let listener = TcpListener::bind(("127.0.0.1", *mock_port)).await?;
        tokio::spawn(async move {
            if let Err(e) = serve_mock_upstream(listener).await {
                error!("mock upstream stopped: {}", e);
            }
        });
        endpoint.get_or_insert_with(|| format!("http://127.0.0.1:{}{}", mock_port, AUCTION_PATH));
    }

    let config = ConfigManager::from_file(&args.config).with_overrides(endpoint, args.timeout_ms);
    let adapter = MocktioneerAdapter::new(&config.adapter)?;
    let client = UpstreamClient::new(config.adapter.timeout_ms);
    info!(endpoint = adapter.endpoint_template(), "mocktioneer adapter ready");

    match args.command {
        Command::Serve { port, .. } => {
            let state = Arc::new(AppState { adapter: Arc::new(adapter), client });
            let app = Router::new()
                .route(AUCTION_PATH, post(handle_openrtb_request))
                .with_state(state);
            let listener = TcpListener::bind(("0.0.0.0", port)).await?;
            info!("adapter server running at http://0.0.0.0:{}", port);
            serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal::ctrl_c().await;
                    info!("Shutting down gracefully...");
                })
                .await?;
        }
        Command::Mock { port } => {
            let listener = TcpListener::bind(("0.0.0.0", port)).await?;
            tokio::select! {
                result = serve_mock_upstream(listener) => result?,
                _ = signal::ctrl_c() => info!("Shutting down gracefully..."),
            }
        }
        Command::Auction { request } => {
            let bid_request: BidRequest = serde_json::from_str(&fs::read_to_string(&request)?)?;
            match run_auction(&adapter, &client, &bid_request).await? {
                Some(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                None => println!("no bid"),
            }
        }
    }
    Ok(())
}
