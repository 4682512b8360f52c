//! TradeBot 터미널 대시보드.
//!
//! # 사용 예시
//!
//! ```bash
//! # 심볼 목록과 잔고 확인
//! tradebot status
//!
//! # BTCUSDT 2개월 5분봉 백테스트
//! tradebot backtest -s BTCUSDT -m 2 -i 5m
//!
//! # CSV 파일로 백테스트 (파일 캔들로 차트까지)
//! tradebot upload data/eth_1m.csv --chart
//!
//! # 누적 거래 기록 다운로드
//! tradebot download-trades -o trades.csv
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradebot_cli::dashboard::chart::{ChartRenderer, ChartSpec, TerminalChart};
use tradebot_cli::dashboard::contract::TradesFile;
use tradebot_cli::dashboard::view::TerminalView;
use tradebot_cli::{Dashboard, DashboardApi, HttpDashboardApi, RunOutcome, Selection};

#[derive(Parser)]
#[command(name = "tradebot")]
#[command(about = "TradeBot backtest dashboard - 터미널 클라이언트", long_about = None)]
#[command(version)]
struct Cli {
    /// 백테스트 서버 주소
    #[arg(long, env = "TRADEBOT_SERVER", default_value = "http://127.0.0.1:8000", global = true)]
    server: String,

    /// ANSI 색상 끄기
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 선택 가능한 심볼과 잔고 표시
    Status,

    /// 심볼/기간으로 백테스트 실행 후 최근 캔들 차트 표시
    Backtest {
        /// 심볼 (기본: 서버 목록의 첫 번째)
        #[arg(short, long)]
        symbol: Option<String>,

        /// 조회 기간 (개월)
        #[arg(short, long, default_value = "1")]
        months: u32,

        /// 캔들 간격 (1m, 5m, 15m, 1h ...)
        #[arg(short, long, default_value = "1m")]
        interval: String,
    },

    /// CSV 파일로 백테스트 실행
    Upload {
        /// 캔들 CSV 파일 경로
        file: PathBuf,

        /// 업로드한 파일의 캔들로 차트 표시
        #[arg(long)]
        chart: bool,
    },

    /// 최근 캔들 차트 표시
    Candles {
        /// 심볼
        #[arg(short, long, default_value = "ETHUSDT")]
        symbol: String,

        /// 캔들 간격
        #[arg(short, long, default_value = "1m")]
        interval: String,

        /// 캔들 수
        #[arg(short, long, default_value = "500")]
        limit: u32,
    },

    /// 누적 거래 기록 CSV 다운로드
    DownloadTrades {
        /// 저장 경로
        #[arg(short, long, default_value = "trades.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let api = Arc::new(HttpDashboardApi::new(&cli.server)?);
    info!(server = %api.base_url(), "Using backtest server");

    let view = TerminalView::new(io::stdout()).with_color(!cli.no_color);
    let mut dashboard = Dashboard::new(api.clone(), view, TerminalChart::new(io::stdout()));

    match cli.command {
        Commands::Status => {
            dashboard.load_status().await;
        }

        Commands::Backtest {
            symbol,
            months,
            interval,
        } => {
            let state = dashboard.load_status().await;
            let symbol = symbol.unwrap_or_else(|| state.default_symbol().to_string());

            let outcome = dashboard
                .run_backtest(&Selection::new(symbol.to_uppercase(), months, interval))
                .await;
            ensure_completed(outcome)?;
        }

        Commands::Upload { file, chart } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.csv".to_string());

            let outcome = dashboard.upload_csv(&file_name, contents, chart).await;
            ensure_completed(outcome)?;
        }

        Commands::Candles {
            symbol,
            interval,
            limit,
        } => {
            let reply = api.fetch_candles(&symbol.to_uppercase(), &interval, limit).await?;
            if let Some(error) = reply.error {
                bail!(error);
            }

            let candles = reply.candles.unwrap_or_default();
            println!(
                "{} {} ({} candles)",
                reply.symbol.unwrap_or(symbol),
                interval,
                candles.len()
            );
            let mut chart = ChartRenderer::new(TerminalChart::new(io::stdout()));
            chart.render(&ChartSpec::from_replies(&candles));
        }

        Commands::DownloadTrades { output } => match api.download_trades().await? {
            TradesFile::Csv(bytes) => {
                tokio::fs::write(&output, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("Saved {} bytes to {}", bytes.len(), output.display());
            }
            TradesFile::Missing(message) => bail!(message),
        },
    }

    Ok(())
}

/// 실패 결과를 종료 코드로 전달합니다. 메시지는 이미 화면에 표시되었습니다.
fn ensure_completed(outcome: RunOutcome) -> Result<()> {
    match outcome {
        RunOutcome::Completed { .. } => Ok(()),
        RunOutcome::Rejected(message) | RunOutcome::Failed(message) => bail!(message),
    }
}
