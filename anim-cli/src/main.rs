//! # Anim CLI
//!
//! 分步动画演示程序：构建一个三步场景，用固定帧间隔驱动调度器，并输出属性状态。
//!
//! ## 用法
//!
//! ```bash
//! # 连续播放全部步骤
//! cargo run -p anim-cli
//!
//! # 只播放第二步，两倍速
//! cargo run -p anim-cli -- --step 1 --speed 2
//!
//! # 指定配置文件与日志级别
//! cargo run -p anim-cli -- --config anim.json --log-level debug
//! ```

mod config;
mod scene;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anim_runtime::{Scheduler, StepAnimator};
use clap::Parser;
use tracing::{Level, info};

use config::AppConfig;
use scene::DemoScene;

#[derive(Parser, Debug)]
#[command(name = "anim-cli")]
#[command(about = "分步动画演示 - 用固定帧间隔驱动调度器并输出属性状态")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "anim.json")]
    config: PathBuf,

    /// 连续播放全部步骤（默认）
    #[arg(long, conflicts_with = "step")]
    master: bool,

    /// 只播放指定步骤（从 0 开始，越界时钳制）
    #[arg(long)]
    step: Option<usize>,

    /// 播放速度倍率（覆盖配置文件）
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<f64>,

    /// 循环播放（覆盖配置文件）
    #[arg(long)]
    repeat: bool,

    /// 最多运行的帧数（覆盖配置文件）
    #[arg(long)]
    frames: Option<u32>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let mut config = AppConfig::load(&cli.config);
    if let Some(speed) = cli.speed {
        config.engine.playback.speed = speed;
    }
    if cli.repeat {
        config.engine.playback.repeat = true;
    }
    if let Some(frames) = cli.frames {
        config.max_frames = frames;
    }
    config.engine.validate()?;

    let scheduler = Scheduler::with_config(config.engine.clock.clone());
    let scene = DemoScene::new();
    let animator = scene.build_steps()?.finalize(&scheduler)?;

    let refreshes = Rc::new(Cell::new(0_u64));
    let counter = refreshes.clone();
    animator.set_sink(Some(Rc::new(move || counter.set(counter.get() + 1))));
    apply_playback(&animator, &config);

    for index in 0..animator.step_count() {
        info!(
            step = index,
            start = animator.step_start_time(index).unwrap_or_default(),
            duration = animator.step_duration(index).unwrap_or_default(),
            "步骤"
        );
    }

    match cli.step {
        Some(step) if !cli.master => {
            animator.play_step(step);
            info!(step = animator.current_step(), "播放单个步骤");
        }
        _ => {
            animator.play_master();
            info!(duration = animator.master_duration(), "播放主时间轴");
        }
    }
    info!(frame = 0, "{scene}");

    let interval = config.engine.clock.frame_interval_ms;
    let mut frame = 0;
    while frame < config.max_frames && animator.is_playing() {
        scheduler.tick(interval);
        frame += 1;

        if frame % config.report_every == 0 {
            info!(
                frame,
                step = animator.current_step(),
                progress = animator.step_progress(),
                "{scene}"
            );
        }
    }

    info!(
        frames = frame,
        refreshes = refreshes.get(),
        clock = scheduler.clock(),
        "播放结束: {scene}"
    );
    scheduler.shutdown();

    Ok(())
}

/// 把播放配置应用到所有播放器
fn apply_playback(animator: &StepAnimator, config: &AppConfig) {
    let playback = &config.engine.playback;
    let players = std::iter::once(animator.master())
        .chain((0..animator.step_count()).filter_map(|index| animator.step_player(index)));
    for player in players {
        player.set_speed(playback.speed);
        player.set_repeat(playback.repeat);
    }
}
