//! # Soundboard Host
//!
//! ## 用法
//!
//! ```bash
//! # 打开看板窗口
//! cargo run -p host
//! cargo run -p host -- --board my_board.json --show-grid
//!
//! # 列出所有效果及其参数
//! cargo run -p host -- list
//!
//! # 不开窗口模拟一个效果
//! cargo run -p host -- simulate firework --frames 180 --mobile
//! cargo run -p host -- simulate burst --cfg '{"radius": 120}'
//! ```

use std::path::PathBuf;

use anyhow::Context;
use board_fx::EffectConfig;
use clap::{Parser, Subcommand};
use host::{App, AppConfig, SimulateOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "soundboard")]
#[command(about = "音效看板 - 按下区域播放样本并生成动画")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 看板文件，覆盖配置中的 board.path
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// 按移动端档位运行
    #[arg(long, global = true)]
    mobile: bool,

    /// 绘制区域网格
    #[arg(long)]
    show_grid: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 以 JSON 列出所有效果
    List,

    /// 不开窗口运行一个效果并输出逐帧报告
    Simulate {
        /// 效果 key
        key: String,

        /// 最多模拟的帧数（60fps）
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// 随机种子
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// 效果参数（JSON 对象）
        #[arg(long)]
        cfg: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn run_simulation(
    key: &str,
    frames: u32,
    seed: u64,
    cfg: Option<&str>,
    mobile: bool,
) -> anyhow::Result<()> {
    let config = match cfg {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("效果参数不是合法的 JSON")?;
            EffectConfig::from_value(&value)
        }
        None => EffectConfig::new(),
    };
    let options = SimulateOptions {
        frames,
        mobile,
        seed,
        config,
    };
    let report = host::simulate(key, &options)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_window(cli: &Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(&cli.config);
    if let Some(board) = &cli.board {
        config.board.path = board.clone();
    }
    config.debug.force_mobile |= cli.mobile;
    config.debug.show_grid |= cli.show_grid;
    config.validate()?;
    info!(board = ?config.board.path, assets = ?config.assets_root, "启动音效看板");

    let event_loop = EventLoop::new().context("无法创建事件循环")?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::List) => serde_json::to_string_pretty(&host::list_effects_json())
            .map(|json| println!("{json}"))
            .map_err(anyhow::Error::from),
        Some(Commands::Simulate {
            key,
            frames,
            seed,
            cfg,
        }) => run_simulation(key, *frames, *seed, cfg.as_deref(), cli.mobile),
        None => run_window(&cli),
    };

    if let Err(e) = result {
        error!(error = %e, "运行失败");
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}
