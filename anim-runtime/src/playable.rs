//! # Playable 模块
//!
//! 播放器：包装一个动画，提供 play / pause / resume / stop / seek 传输控制。
//!
//! ## 状态机
//!
//! ```text
//! Stopped --play--> Playing --pause--> Paused --resume--> Playing
//!    ^                 |                  |
//!    +------stop-------+-------stop-------+
//! ```
//!
//! 只有 `Playing` 状态的播放器注册在调度器中。`stop` 不重置经过时间，
//! 非循环播放到达区间端点时自动停止。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::animation::Animation;
use crate::config::PlaybackConfig;
use crate::property::RenderSink;
use crate::scheduler::{Scheduler, WeakScheduler};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Paused,
    Playing,
}

struct PlayableInner {
    animation: Rc<dyn Animation>,
    scheduler: WeakScheduler,
    sink: RefCell<Option<Rc<dyn RenderSink>>>,
    state: Cell<PlayState>,
    elapsed: Cell<f64>,
    speed: Cell<f64>,
    repeat: Cell<bool>,
    /// 自定义播放区间，`None` 表示整个动画
    range: Cell<Option<(f64, f64)>>,
}

/// 播放器句柄（克隆后指向同一个播放器）
#[derive(Clone)]
pub struct Playable {
    inner: Rc<PlayableInner>,
}

impl fmt::Debug for Playable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playable")
            .field("state", &self.state())
            .field("elapsed", &self.elapsed())
            .field("range", &self.range())
            .field("speed", &self.speed())
            .field("repeat", &self.repeat())
            .finish()
    }
}

impl Playable {
    /// 创建播放器（初始为 `Stopped`，不写入任何属性）
    pub fn new(animation: Rc<dyn Animation>, scheduler: &Scheduler) -> Self {
        Self {
            inner: Rc::new(PlayableInner {
                animation,
                scheduler: scheduler.downgrade(),
                sink: RefCell::new(None),
                state: Cell::new(PlayState::Stopped),
                elapsed: Cell::new(0.0),
                speed: Cell::new(1.0),
                repeat: Cell::new(false),
                range: Cell::new(None),
            }),
        }
    }

    /// 应用播放配置中的速度与循环设置
    pub fn with_config(self, config: &PlaybackConfig) -> Self {
        self.set_speed(config.speed);
        self.set_repeat(config.repeat);
        self
    }

    /// 设置渲染通知目标
    pub fn with_sink(self, sink: Rc<dyn RenderSink>) -> Self {
        self.set_sink(Some(sink));
        self
    }

    pub fn set_sink(&self, sink: Option<Rc<dyn RenderSink>>) {
        *self.inner.sink.borrow_mut() = sink;
    }

    // ========== 传输控制 ==========

    /// 从区间起点开始播放（速度为负时从终点开始）
    pub fn play(&self) {
        let (from, to) = self.range();
        let start = if self.speed() < 0.0 { to } else { from };
        self.inner.elapsed.set(start);

        if self.inner.scheduler.register(self) {
            self.inner.state.set(PlayState::Playing);
            debug!(from, to, speed = self.speed(), "开始播放");
        } else {
            self.inner.state.set(PlayState::Stopped);
        }
        self.apply();
    }

    /// 暂停（只对播放中的播放器有效）
    pub fn pause(&self) {
        if self.state() != PlayState::Playing {
            return;
        }
        self.inner.state.set(PlayState::Paused);
        self.inner.scheduler.unregister(self);
    }

    /// 从暂停处继续（只对暂停中的播放器有效）
    pub fn resume(&self) {
        if self.state() != PlayState::Paused {
            return;
        }
        if self.inner.scheduler.register(self) {
            self.inner.state.set(PlayState::Playing);
        }
    }

    /// 停止播放，保留当前经过时间
    pub fn stop(&self) {
        self.inner.state.set(PlayState::Stopped);
        self.inner.scheduler.unregister(self);
    }

    /// 跳转到时间 `t`（钳制到播放区间），不改变播放状态
    pub fn seek(&self, t: f64) {
        let (from, to) = self.range();
        let t = if t.is_nan() { from } else { t.clamp(from, to) };
        self.inner.elapsed.set(t);
        self.apply();
    }

    /// 推进 `delta_ms`（由调度器每帧调用）
    pub fn advance(&self, delta_ms: f64) {
        if self.state() != PlayState::Playing {
            return;
        }

        let (from, to) = self.range();
        let speed = self.speed();
        let mut elapsed = self.elapsed() + delta_ms * speed;
        let len = to - from;

        let overshoot = (speed > 0.0 && elapsed >= to) || (speed < 0.0 && elapsed <= from);
        if overshoot {
            if self.repeat() && len > 0.0 {
                // 先停在越过的端点，端点及被跳过区间内的触发器才能触发
                self.inner.elapsed.set(if speed > 0.0 { to } else { from });
                self.apply();
                if self.state() != PlayState::Playing {
                    return;
                }
                elapsed = from + (elapsed - from).rem_euclid(len);
            } else {
                elapsed = if speed > 0.0 { to } else { from };
                self.stop();
                debug!(elapsed, "播放到达端点，自动停止");
            }
        }

        self.inner.elapsed.set(elapsed);
        self.apply();
    }

    /// 写入当前时间的动画状态并通知渲染
    ///
    /// 调用期间不持有任何借用，动画的触发器可以自由操作播放器。
    fn apply(&self) {
        self.inner.animation.set_elapsed(self.elapsed());
        let sink = self.inner.sink.borrow().clone();
        if let Some(sink) = sink {
            sink.refresh();
        }
    }

    /// 调度器关闭时调用：只改状态，不再注销
    pub(crate) fn detach(&self) {
        self.inner.state.set(PlayState::Stopped);
    }

    pub(crate) fn same_as(&self, other: &Playable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 设置 ==========

    /// 设置速度倍率（负数倒放，0 停滞）；非有限值被忽略
    pub fn set_speed(&self, speed: f64) {
        if speed.is_finite() {
            self.inner.speed.set(speed);
        }
    }

    pub fn speed(&self) -> f64 {
        self.inner.speed.get()
    }

    pub fn set_repeat(&self, repeat: bool) {
        self.inner.repeat.set(repeat);
    }

    pub fn repeat(&self) -> bool {
        self.inner.repeat.get()
    }

    /// 设置播放区间，端点钳制到 `[0, duration]`，颠倒时自动交换
    ///
    /// 当前经过时间也会被钳制进新区间（不写入属性）。
    pub fn set_range(&self, from: f64, to: f64) {
        let duration = self.duration();
        let clamp = |t: f64| if t.is_nan() { 0.0 } else { t.clamp(0.0, duration) };
        let (mut from, mut to) = (clamp(from), clamp(to));
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }
        self.inner.range.set(Some((from, to)));
        self.inner.elapsed.set(self.elapsed().clamp(from, to));
    }

    /// 恢复为整个动画
    pub fn reset_range(&self) {
        self.inner.range.set(None);
    }

    // ========== 查询 ==========

    /// 播放区间 `(from, to)`
    pub fn range(&self) -> (f64, f64) {
        self.inner
            .range
            .get()
            .unwrap_or_else(|| (0.0, self.duration()))
    }

    pub fn elapsed(&self) -> f64 {
        self.inner.elapsed.get()
    }

    /// 区间内进度 `[0, 1]`，空区间视为 1
    pub fn progress(&self) -> f64 {
        let (from, to) = self.range();
        if to <= from {
            return 1.0;
        }
        ((self.elapsed() - from) / (to - from)).clamp(0.0, 1.0)
    }

    pub fn state(&self) -> PlayState {
        self.inner.state.get()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayState::Playing
    }

    pub fn duration(&self) -> f64 {
        self.inner.animation.duration().max(0.0)
    }

    pub fn animation(&self) -> &Rc<dyn Animation> {
        &self.inner.animation
    }
}
