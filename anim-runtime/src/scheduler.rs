//! # Scheduler 模块
//!
//! 帧时钟：宿主的渲染循环每帧调用一次 `tick`，调度器按注册顺序推进所有活跃的播放器。
//!
//! 调度器是显式创建的实例，播放器在构造时拿到它的句柄；
//! 测试中可以同时存在多个互不影响的调度器。
//!
//! ## 重入
//!
//! `tick` 先复制一份活跃列表再逐个推进，推进期间不持有内部借用。
//! 因此触发器回调里启动、停止其它播放器是安全的：
//! 本帧被停止的播放器会被跳过；不在本帧快照里的播放器从下一帧开始推进；
//! 已在快照里、被排在前面的触发器先停止再重新启动的播放器，本帧照常推进。

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{info, trace, warn};

use crate::config::ClockConfig;
use crate::playable::Playable;

/// 调度器内部状态
pub(crate) struct SchedulerState {
    /// 活跃的播放器（注册顺序）
    active: Vec<Playable>,
    /// 单调时钟（毫秒）
    clock: f64,
    /// 上一次 `tick_at` 的宿主时间戳
    last_timestamp: Option<f64>,
    config: ClockConfig,
    shut_down: bool,
}

/// 调度器句柄
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerState>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("active", &state.active.len())
            .field("clock", &state.clock)
            .field("shut_down", &state.shut_down)
            .finish()
    }
}

impl Scheduler {
    /// 创建调度器
    pub fn new() -> Self {
        Self::with_config(ClockConfig::default())
    }

    /// 使用指定时钟配置创建调度器
    pub fn with_config(config: ClockConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerState {
                active: Vec::new(),
                clock: 0.0,
                last_timestamp: None,
                config,
                shut_down: false,
            })),
        }
    }

    /// 推进一帧
    ///
    /// `delta_ms` 会被限制在 `[0, max_delta_ms]`。
    pub fn tick(&self, delta_ms: f64) {
        let (delta, snapshot) = {
            let mut state = self.inner.borrow_mut();
            if state.shut_down {
                return;
            }
            let delta = if delta_ms.is_nan() {
                0.0
            } else {
                delta_ms.clamp(0.0, state.config.max_delta_ms)
            };
            state.clock += delta;
            (delta, state.active.clone())
        };

        trace!(delta, active = snapshot.len(), "调度器 tick");
        for playable in &snapshot {
            playable.advance(delta);
        }
    }

    /// 以宿主提供的时间戳推进一帧
    ///
    /// 第一次调用只记录时间戳，不推进。
    pub fn tick_at(&self, now_ms: f64) {
        let last = self.inner.borrow_mut().last_timestamp.replace(now_ms);
        if let Some(last) = last {
            self.tick(now_ms - last);
        }
    }

    /// 关闭调度器：清空活跃列表，之后的注册都会被忽略
    pub fn shutdown(&self) {
        let active = {
            let mut state = self.inner.borrow_mut();
            if state.shut_down {
                return;
            }
            info!(active = state.active.len(), "调度器关闭");
            state.shut_down = true;
            std::mem::take(&mut state.active)
        };
        for playable in active {
            playable.detach();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.borrow().shut_down
    }

    /// 活跃播放器数量
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    /// 调度器时钟（毫秒）
    pub fn clock(&self) -> f64 {
        self.inner.borrow().clock
    }

    /// 时钟配置
    pub fn config(&self) -> ClockConfig {
        self.inner.borrow().config.clone()
    }

    pub(crate) fn downgrade(&self) -> WeakScheduler {
        WeakScheduler(Rc::downgrade(&self.inner))
    }
}

/// 播放器持有的弱引用，避免调度器与播放器互相持有
#[derive(Clone)]
pub(crate) struct WeakScheduler(Weak<RefCell<SchedulerState>>);

impl WeakScheduler {
    /// 注册播放器（重复注册无效果），调度器不可用时返回 `false`
    pub(crate) fn register(&self, playable: &Playable) -> bool {
        let Some(inner) = self.0.upgrade() else {
            warn!("调度器已被释放，播放器无法注册");
            return false;
        };
        let mut state = inner.borrow_mut();
        if state.shut_down {
            warn!("调度器已关闭，忽略播放器注册");
            return false;
        }
        if !state.active.iter().any(|p| p.same_as(playable)) {
            state.active.push(playable.clone());
        }
        true
    }

    /// 注销播放器（未注册时无效果）
    pub(crate) fn unregister(&self, playable: &Playable) {
        if let Some(inner) = self.0.upgrade() {
            inner.borrow_mut().active.retain(|p| !p.same_as(playable));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationNode;
    use crate::playable::PlayState;
    use crate::property::Property;

    fn playable(scheduler: &Scheduler, duration: f64) -> (Playable, Rc<Property<f32>>) {
        let prop = Property::new(0.0_f32);
        let mut node = AnimationNode::new(duration);
        node.lerp_to(&prop, 100.0);
        (Playable::new(Rc::new(node), scheduler), prop)
    }

    #[test]
    fn test_tick_advances_active_playables() {
        let scheduler = Scheduler::new();
        let (p, prop) = playable(&scheduler, 100.0);

        p.play();
        assert_eq!(scheduler.active_count(), 1);

        scheduler.tick(25.0);
        assert_eq!(prop.get(), 25.0);
        assert_eq!(scheduler.clock(), 25.0);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let scheduler = Scheduler::new();
        let (p, _) = playable(&scheduler, 100.0);

        p.play();
        p.play();
        p.resume();
        assert_eq!(scheduler.active_count(), 1);

        p.stop();
        p.stop();
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_delta_is_clamped() {
        let scheduler = Scheduler::with_config(ClockConfig {
            frame_interval_ms: 10.0,
            max_delta_ms: 50.0,
        });
        let (p, prop) = playable(&scheduler, 400.0);
        p.play();

        scheduler.tick(400.0);
        assert_eq!(scheduler.clock(), 50.0);
        assert_eq!(prop.get(), 12.5);

        scheduler.tick(-10.0);
        scheduler.tick(f64::NAN);
        assert_eq!(scheduler.clock(), 50.0);
    }

    #[test]
    fn test_tick_at_uses_timestamp_difference() {
        let scheduler = Scheduler::new();
        let (p, prop) = playable(&scheduler, 128.0);
        p.play();

        scheduler.tick_at(1000.0);
        assert_eq!(prop.get(), 0.0);
        scheduler.tick_at(1016.0);
        assert_eq!(prop.get(), 12.5);
    }

    #[test]
    fn test_shutdown_ignores_new_registrations() {
        let scheduler = Scheduler::new();
        let (p, prop) = playable(&scheduler, 100.0);
        p.play();

        scheduler.shutdown();
        assert!(scheduler.is_shut_down());
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(p.state(), PlayState::Stopped);

        let (q, _) = playable(&scheduler, 100.0);
        q.play();
        assert_eq!(scheduler.active_count(), 0);
        assert!(!q.is_playing());

        scheduler.tick(50.0);
        assert_eq!(prop.get(), 0.0);
    }

    #[test]
    fn test_independent_schedulers() {
        let first = Scheduler::new();
        let second = Scheduler::new();
        let (a, prop_a) = playable(&first, 100.0);
        let (b, prop_b) = playable(&second, 100.0);
        a.play();
        b.play();

        first.tick(50.0);
        assert_eq!(prop_a.get(), 50.0);
        assert_eq!(prop_b.get(), 0.0);
    }
}
