//! # Animation 模块
//!
//! 动画的统一播放契约。
//!
//! ## 核心设计理念
//!
//! 动画只负责 **时间到属性状态的映射**：
//! - 给定经过时间 `t`，确定性地写入属性值
//! - 结果只取决于 `t` 与冻结的初始 / 最终快照，与之前调用过的 `t` 无关
//! - 不触发渲染，渲染由 `Playable` 通知 `RenderSink`
//!
//! `AnimationNode`、`AnimationGroup`、`Timeline` 都实现 [`Animation`]，
//! 因此可以任意层级嵌套。

mod group;
mod node;

pub use group::AnimationGroup;
pub use node::{AnimationNode, CycleCount};

use crate::error::AnimationError;
use crate::property::PropertyKey;

/// 动画播放契约
pub trait Animation {
    /// 总时长（毫秒）
    fn duration(&self) -> f64;

    /// 该动画会写入的全部属性
    fn property_keys(&self) -> Vec<PropertyKey>;

    /// 只更新某一个属性到时间 `t` 的状态
    fn set_property_elapsed(&self, key: PropertyKey, t: f64);

    /// 同步一次性触发器到时间 `t`
    ///
    /// `t` 不做钳制：嵌套的时间轴需要区分“尚未开始”与“恰好在起点”。
    fn sync_triggers(&self, _t: f64) {}

    /// 把所有属性更新到时间 `t` 的状态
    fn set_elapsed(&self, t: f64) {
        let t = clamp_time(t, self.duration());
        for key in self.property_keys() {
            self.set_property_elapsed(key, t);
        }
        self.sync_triggers(t);
    }

    /// 构建期检查（例如仍有未提交最终值的属性）
    fn validate(&self) -> Result<(), AnimationError> {
        Ok(())
    }
}

/// 把时间钳制到 `[0, max]`，NaN 视为 0
pub(crate) fn clamp_time(t: f64, max: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, max.max(0.0))
}
