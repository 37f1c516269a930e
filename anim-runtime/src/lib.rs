//! # Anim Runtime
//!
//! 演示动画引擎的核心运行时库。
//!
//! ## 架构概述
//!
//! `anim-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它只做一件事：把 **经过时间** 确定性地映射为 **属性状态**。
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── Scheduler::tick(delta) ──────►│
//!   │                                   │ Playable::advance
//!   │                                   │ Animation::set_elapsed
//!   │                                   │ (写入 Property)
//!   │◄─── RenderSink::refresh() ────────│
//!   │                                   │
//! ```
//!
//! ## 核心类型
//!
//! - [`AnimatableProperty`]：宿主提供的可动画属性（快照 / 恢复 / 插值）
//! - [`AnimationNode`]：把属性绑定到一段时长、循环与缓动
//! - [`AnimationGroup`]：并行播放的一组动画
//! - [`Timeline`]：按锚定规则排列的动画与触发器
//! - [`StepAnimator`]：由多个步骤拼成的演示
//! - [`Playable`] / [`Scheduler`]：传输控制与帧时钟
//!
//! ## 使用示例
//!
//! ```ignore
//! use anim_runtime::{AnimationNode, Playable, Position, Property, Scheduler, Timeline};
//!
//! let scheduler = Scheduler::new();
//! let opacity = Property::new(0.0_f32);
//!
//! let mut fade = AnimationNode::new(300.0);
//! fade.lerp_to(&opacity, 1.0);
//!
//! let mut timeline = Timeline::new();
//! timeline.add_animation(fade, Position::Absolute, 0.0)?;
//!
//! let playable = Playable::new(Rc::new(timeline), &scheduler);
//! playable.play();
//!
//! // 宿主渲染循环
//! loop {
//!     scheduler.tick(16.0);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`property`]：属性能力与渲染通知
//! - [`value`]：内置的可插值值类型
//! - [`easing`]：缓动函数
//! - [`animation`]：动画契约、节点与组
//! - [`timeline`]：时间轴、片段与触发器
//! - [`step`]：分步动画
//! - [`playable`]：播放器状态机
//! - [`scheduler`]：调度器
//! - [`config`]：播放与时钟配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod playable;
pub mod property;
pub mod scheduler;
pub mod step;
pub mod timeline;
pub mod value;

// 重导出核心类型
pub use animation::{Animation, AnimationGroup, AnimationNode, CycleCount};
pub use config::{ClockConfig, EngineConfig, PlaybackConfig};
pub use easing::Easing;
pub use error::{AnimError, AnimResult, AnimationError, ConfigError, StepError, TimelineError};
pub use playable::{PlayState, Playable};
pub use property::{AnimatableProperty, Property, PropertyKey, RenderSink};
pub use scheduler::Scheduler;
pub use step::{StepAnimator, StepAnimatorBuilder, StepHandle};
pub use timeline::{PartInfo, PartKind, Position, Timeline, Trigger, TriggerDirection};
pub use value::{Color, Lerp, Transform, Vec2};
