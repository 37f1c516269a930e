//! # Node 模块
//!
//! 原子动画单元：把一组属性绑定到 “周期时长 × 周期数 + 缓动” 的时间程序上。
//!
//! ## 生命周期
//!
//! 1. 创建并配置（时长、周期、缓动、反向、交替）
//! 2. `track` 记录属性初始值，随后由作者把属性改到最终状态
//! 3. `commit_final` 冻结最终值
//! 4. 加入某个时间轴片段，此后只响应时间查询

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Animation;
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::property::{
    AnimatableProperty, Binding, InitialOnly, PendingBinding, PropertyKey, SnapshotBinding,
};

/// 周期数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleCount {
    /// 有限次（0 按 1 处理）
    Finite(u32),
    /// 无限循环：时长按单个周期报告，循环由调用方负责
    Infinite,
}

impl Default for CycleCount {
    fn default() -> Self {
        Self::Finite(1)
    }
}

/// 动画节点
pub struct AnimationNode {
    /// 单个周期时长（毫秒）
    cycle_duration: f64,
    /// 周期数
    cycles: CycleCount,
    /// 缓动函数
    easing: Easing,
    /// 是否反向播放
    reversed: bool,
    /// 奇数周期是否反向
    alternate: bool,
    /// 已冻结的绑定
    bindings: Vec<Box<dyn Binding>>,
    /// 等待提交最终值的绑定
    pending: Vec<Box<dyn PendingBinding>>,
}

impl fmt::Debug for AnimationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationNode")
            .field("cycle_duration", &self.cycle_duration)
            .field("cycles", &self.cycles)
            .field("easing", &self.easing)
            .field("reversed", &self.reversed)
            .field("alternate", &self.alternate)
            .field("bindings", &self.bindings.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl AnimationNode {
    /// 创建单周期、线性缓动的动画节点
    pub fn new(cycle_duration: f64) -> Self {
        Self {
            cycle_duration,
            cycles: CycleCount::default(),
            easing: Easing::default(),
            reversed: false,
            alternate: false,
            bindings: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// 设置周期数
    pub fn with_cycles(mut self, cycles: CycleCount) -> Self {
        self.cycles = cycles;
        self
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// 设置反向播放
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// 设置交替播放（奇数周期反向）
    pub fn with_alternate(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    pub fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    pub fn cycles(&self) -> CycleCount {
        self.cycles
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    // ========== 属性绑定 ==========

    /// 记录属性当前值作为初始值，等待 `commit_final`
    pub fn track<P: AnimatableProperty>(&mut self, property: &Rc<P>) -> PropertyKey {
        let key = PropertyKey::of(property);
        self.forget(key);
        self.pending
            .push(Box::new(InitialOnly::capture(property.clone())));
        key
    }

    /// 冻结所有待提交属性的最终值（取属性的当前值）
    pub fn commit_final(&mut self) {
        for pending in self.pending.drain(..) {
            self.bindings.push(pending.commit());
        }
    }

    /// 以当前值为初始值、`target` 为最终值绑定属性
    ///
    /// 绑定后属性停留在 `target`，下一次作者调用可以从这里继续。
    pub fn lerp_to<P: AnimatableProperty>(
        &mut self,
        property: &Rc<P>,
        target: P::Snapshot,
    ) -> PropertyKey {
        let initial = property.snapshot();
        let key = self.bind(property, initial, target.clone());
        property.restore(&target);
        key
    }

    /// 以显式给出的两个快照绑定属性，不修改属性当前值
    pub fn bind<P: AnimatableProperty>(
        &mut self,
        property: &Rc<P>,
        from: P::Snapshot,
        to: P::Snapshot,
    ) -> PropertyKey {
        let key = PropertyKey::of(property);
        self.forget(key);
        self.bindings
            .push(Box::new(SnapshotBinding::new(property.clone(), from, to)));
        key
    }

    /// 同一节点内重复绑定同一属性时，以后一次为准
    fn forget(&mut self, key: PropertyKey) {
        let before = self.bindings.len() + self.pending.len();
        self.bindings.retain(|b| b.key() != key);
        self.pending.retain(|p| p.key() != key);
        if self.bindings.len() + self.pending.len() != before {
            warn!(property = %key, "属性在同一动画节点中被重复绑定，旧绑定已丢弃");
        }
    }

    // ========== 时间计算 ==========

    fn effective_cycle_duration(&self) -> f64 {
        if self.cycle_duration.is_finite() && self.cycle_duration > 0.0 {
            self.cycle_duration
        } else {
            0.0
        }
    }

    /// 计算时间 `t` 对应的 (周期索引, 周期内原始进度)
    fn cycle_position(&self, t: f64) -> (u64, f64) {
        let cd = self.effective_cycle_duration();
        let t = if t.is_nan() { 0.0 } else { t.max(0.0) };

        match self.cycles {
            CycleCount::Finite(n) => {
                let n = u64::from(n.max(1));
                if cd == 0.0 {
                    return (n - 1, 1.0);
                }
                let index = ((t / cd).floor() as u64).min(n - 1);
                let fraction = if t >= n as f64 * cd {
                    1.0
                } else {
                    (t % cd) / cd
                };
                (index, fraction)
            }
            CycleCount::Infinite => {
                if cd == 0.0 {
                    return (0, 1.0);
                }
                let whole = (t / cd).floor();
                let rem = t - whole * cd;
                if t > 0.0 && rem <= 0.0 {
                    // 恰好落在周期边界上：视为上一周期结束
                    ((whole as u64).saturating_sub(1), 1.0)
                } else {
                    (whole as u64, rem / cd)
                }
            }
        }
    }

    /// 时间 `t` 对应的缓动后 alpha
    pub fn alpha_at(&self, t: f64) -> f32 {
        let (index, mut fraction) = self.cycle_position(t);
        if self.reversed {
            fraction = 1.0 - fraction;
        }
        if self.alternate && index % 2 == 1 {
            fraction = 1.0 - fraction;
        }
        self.easing.apply(fraction as f32)
    }
}

impl Animation for AnimationNode {
    fn duration(&self) -> f64 {
        let cd = self.effective_cycle_duration();
        match self.cycles {
            CycleCount::Finite(n) => cd * f64::from(n.max(1)),
            CycleCount::Infinite => cd,
        }
    }

    fn property_keys(&self) -> Vec<PropertyKey> {
        self.bindings.iter().map(|b| b.key()).collect()
    }

    fn set_property_elapsed(&self, key: PropertyKey, t: f64) {
        let alpha = self.alpha_at(t);
        for binding in self.bindings.iter().filter(|b| b.key() == key) {
            binding.apply(alpha);
        }
    }

    fn set_elapsed(&self, t: f64) {
        let alpha = self.alpha_at(t);
        for binding in &self.bindings {
            binding.apply(alpha);
        }
    }

    fn validate(&self) -> Result<(), AnimationError> {
        if !self.cycle_duration.is_finite() || self.cycle_duration < 0.0 {
            return Err(AnimationError::InvalidDuration {
                duration: self.cycle_duration,
            });
        }
        if let Some(pending) = self.pending.first() {
            return Err(AnimationError::UncommittedProperty {
                property: pending.key(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    fn lerp_node(duration: f64) -> (AnimationNode, Rc<Property<f32>>) {
        let prop = Property::new(0.0_f32);
        let mut node = AnimationNode::new(duration);
        node.lerp_to(&prop, 100.0);
        (node, prop)
    }

    #[test]
    fn test_lerp_to_leaves_target() {
        let (_node, prop) = lerp_node(1000.0);
        assert_eq!(prop.get(), 100.0);
    }

    #[test]
    fn test_set_elapsed_is_deterministic() {
        let (node, prop) = lerp_node(1000.0);

        node.set_elapsed(1000.0);
        node.set_elapsed(250.0);
        assert_eq!(prop.get(), 25.0);

        node.set_elapsed(0.0);
        node.set_elapsed(250.0);
        assert_eq!(prop.get(), 25.0);
    }

    #[test]
    fn test_clamping() {
        let (node, prop) = lerp_node(1000.0);

        node.set_elapsed(-10.0);
        assert_eq!(prop.get(), 0.0);
        node.set_elapsed(5000.0);
        assert_eq!(prop.get(), 100.0);
        node.set_elapsed(f64::NAN);
        assert_eq!(prop.get(), 0.0);
    }

    #[test]
    fn test_alternate_two_cycles() {
        let node = AnimationNode::new(100.0)
            .with_cycles(CycleCount::Finite(2))
            .with_alternate(true);

        assert_eq!(node.duration(), 200.0);
        assert_eq!(node.alpha_at(0.0), 0.0);
        assert_eq!(node.alpha_at(50.0), 0.5);
        assert_eq!(node.alpha_at(100.0), 1.0);
        assert_eq!(node.alpha_at(150.0), 0.5);
        assert!(node.alpha_at(199.0) < 0.02);
        assert_eq!(node.alpha_at(200.0), 0.0);
    }

    #[test]
    fn test_repeat_without_alternate_restarts() {
        let node = AnimationNode::new(100.0).with_cycles(CycleCount::Finite(3));

        assert_eq!(node.alpha_at(99.0), 0.99);
        assert_eq!(node.alpha_at(100.0), 0.0);
        assert_eq!(node.alpha_at(300.0), 1.0);
    }

    #[test]
    fn test_reversed() {
        let node = AnimationNode::new(100.0).with_reversed(true);
        assert_eq!(node.alpha_at(0.0), 1.0);
        assert_eq!(node.alpha_at(25.0), 0.75);
        assert_eq!(node.alpha_at(100.0), 0.0);
    }

    #[test]
    fn test_zero_cycles_counts_as_one() {
        let node = AnimationNode::new(100.0).with_cycles(CycleCount::Finite(0));
        assert_eq!(node.duration(), 100.0);
        assert_eq!(node.alpha_at(100.0), 1.0);
    }

    #[test]
    fn test_zero_duration_snaps_to_final() {
        let node = AnimationNode::new(0.0);
        assert_eq!(node.duration(), 0.0);
        assert_eq!(node.alpha_at(0.0), 1.0);
    }

    #[test]
    fn test_infinite_reports_single_cycle() {
        let node = AnimationNode::new(100.0)
            .with_cycles(CycleCount::Infinite)
            .with_alternate(true);

        assert_eq!(node.duration(), 100.0);
        assert_eq!(node.alpha_at(100.0), 1.0);
        assert_eq!(node.alpha_at(150.0), 0.5);
        assert_eq!(node.alpha_at(200.0), 0.0);
        assert_eq!(node.alpha_at(250.0), 0.5);
    }

    #[test]
    fn test_easing_applied_after_direction() {
        let node = AnimationNode::new(100.0)
            .with_easing(Easing::EaseInQuad)
            .with_reversed(true);
        // 反向后进度 0.75，再经过二次缓入
        assert!((node.alpha_at(25.0) - 0.5625).abs() < 1e-6);
    }

    #[test]
    fn test_track_and_commit() {
        let prop = Property::new(10.0_f32);
        let mut node = AnimationNode::new(100.0);

        let key = node.track(&prop);
        assert!(matches!(
            node.validate(),
            Err(AnimationError::UncommittedProperty { property }) if property == key
        ));

        prop.set(20.0);
        node.commit_final();
        assert!(node.validate().is_ok());

        node.set_elapsed(50.0);
        assert_eq!(prop.get(), 15.0);
    }

    #[test]
    fn test_rebinding_replaces_previous() {
        let prop = Property::new(0.0_f32);
        let mut node = AnimationNode::new(100.0);
        node.bind(&prop, 0.0, 10.0);
        node.bind(&prop, 0.0, 50.0);

        assert_eq!(node.property_keys().len(), 1);
        node.set_elapsed(100.0);
        assert_eq!(prop.get(), 50.0);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let node = AnimationNode::new(f64::NAN);
        assert!(matches!(
            node.validate(),
            Err(AnimationError::InvalidDuration { .. })
        ));
        let node = AnimationNode::new(-1.0);
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_set_property_elapsed_only_touches_key() {
        let a = Property::new(0.0_f32);
        let b = Property::new(0.0_f32);
        let mut node = AnimationNode::new(100.0);
        let key_a = node.lerp_to(&a, 10.0);
        node.lerp_to(&b, 10.0);

        node.set_elapsed(0.0);
        node.set_property_elapsed(key_a, 100.0);
        assert_eq!(a.get(), 10.0);
        assert_eq!(b.get(), 0.0);
    }
}
