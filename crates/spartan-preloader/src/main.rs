//! 캐시 프리로더 CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use spartan_core::logging::{init_logging, LogConfig};
use spartan_core::{AppConfig, AssetClass};
use spartan_data::MarketDataService;
use spartan_preloader::targets::{quote_targets, series_targets};
use spartan_preloader::{modules, workflow, PreloadTargets};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "spartan-preloader")]
#[command(about = "Spartan Research Station cache preloader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error). 없으면 설정 파일 값
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 시세 프리로드
    Quotes {
        /// 특정 심볼만 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,

        /// 자산 분류 (stock, crypto, forex)
        #[arg(long)]
        class: Option<String>,
    },

    /// FRED 시계열 프리로드
    Economic {
        /// 특정 시계열만 (쉼표로 구분, 예: "DGS10,UNRATE")
        #[arg(long)]
        series: Option<String>,
    },

    /// 캐시/저장소 상태 검증 및 마커 기록
    Validate,

    /// 전체 워크플로우 실행 (시세 → 경제 지표 → 검증)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();
    let config = AppConfig::load_default().context("설정 로드 실패")?;

    let log_config = LogConfig::from_app_config(&config.logging).with_level_override(cli.log_level);
    if let Err(e) = init_logging(log_config) {
        eprintln!("로깅 초기화 실패: {}", e);
    }

    tracing::info!("Spartan Preloader 시작");

    let service = MarketDataService::from_config(&config)
        .await
        .context("시장 데이터 서비스 초기화 실패")?;
    tracing::info!(
        has_db = service.database().is_some(),
        has_cache = service.cache().is_some(),
        has_fred = service.has_series_source(),
        "서비스 연결 상태"
    );

    let preload = &config.preload;

    match cli.command {
        Commands::Quotes { symbols, class } => {
            let class = class
                .as_deref()
                .map(str::parse::<AssetClass>)
                .transpose()?;
            let symbols = quote_targets(&config, symbols.as_deref(), class)?;
            let stats =
                modules::preload_quotes(&service, &symbols, preload.request_delay()).await;
            stats.log_summary("시세 프리로드");
        }
        Commands::Economic { series } => {
            let series = series_targets(&config, series.as_deref())?;
            let stats = modules::preload_series(
                &service,
                &series,
                preload.series_limit,
                preload.request_delay(),
            )
            .await;
            stats.log_summary("경제 지표 프리로드");
        }
        Commands::Validate => {
            let targets = PreloadTargets::from_config(&config);
            let status = modules::validate_preload(
                &service,
                &targets,
                preload.series_limit,
                preload.min_success_pct,
            )
            .await;
            modules::write_marker(&service, &status).await;
            if !status.passed {
                anyhow::bail!(
                    "프리로드 검증 실패: {:.1}% < {:.1}%",
                    status.success_pct,
                    preload.min_success_pct
                );
            }
        }
        Commands::RunAll => {
            let targets = PreloadTargets::from_config(&config);
            workflow::run_all(&service, preload, &targets).await?;
        }
        Commands::Daemon => {
            let targets = PreloadTargets::from_config(&config);
            let shutdown = CancellationToken::new();

            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install Ctrl+C handler");
                signal_token.cancel();
            });

            let runs = workflow::run_daemon(&service, preload, &targets, shutdown).await;
            tracing::info!(runs, "데몬 종료");
        }
    }

    tracing::info!("Spartan Preloader 종료");
    Ok(())
}
