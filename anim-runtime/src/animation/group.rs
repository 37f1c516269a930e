//! # Group 模块
//!
//! 动画组：多个动画同步播放，时长取成员最大值。
//!
//! 时间原样转发给每个属性的所属成员，组本身不做归一化。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::{Animation, AnimationNode};
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::property::{AnimatableProperty, PropertyKey};

/// 动画组
#[derive(Default)]
pub struct AnimationGroup {
    /// 成员动画
    children: Vec<Rc<dyn Animation>>,
    /// 属性 -> 所属成员索引
    owners: HashMap<PropertyKey, usize>,
    /// 属性注册顺序
    order: Vec<PropertyKey>,
    /// 成员时长最大值
    duration: f64,
}

impl fmt::Debug for AnimationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationGroup")
            .field("children", &self.children.len())
            .field("properties", &self.order.len())
            .field("duration", &self.duration)
            .finish()
    }
}

impl AnimationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加成员动画
    pub fn add_animation<A: Animation + 'static>(&mut self, child: A) -> &mut Self {
        self.add_shared(Rc::new(child))
    }

    /// 添加共享的成员动画
    ///
    /// 如果两个成员写同一个属性，后注册的成员获得该属性。
    pub fn add_shared(&mut self, child: Rc<dyn Animation>) -> &mut Self {
        let index = self.children.len();
        for key in child.property_keys() {
            match self.owners.insert(key, index) {
                Some(previous) if previous != index => {
                    warn!(
                        property = %key,
                        previous,
                        index,
                        "动画组中多个成员写同一属性，后注册的成员生效"
                    );
                }
                Some(_) => {}
                None => self.order.push(key),
            }
        }
        self.duration = self.duration.max(child.duration());
        self.children.push(child);
        self
    }

    /// 为每个属性自动创建一个插值节点
    ///
    /// 每个属性从当前值过渡到给定目标值，绑定后属性停留在目标值。
    pub fn add_lerp_properties<P, I>(&mut self, targets: I, duration: f64, easing: Easing) -> &mut Self
    where
        P: AnimatableProperty,
        I: IntoIterator<Item = (Rc<P>, P::Snapshot)>,
    {
        for (property, target) in targets {
            let mut node = AnimationNode::new(duration).with_easing(easing);
            node.lerp_to(&property, target);
            self.add_animation(node);
        }
        self
    }

    /// 成员数量
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Animation for AnimationGroup {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn property_keys(&self) -> Vec<PropertyKey> {
        self.order.clone()
    }

    fn set_property_elapsed(&self, key: PropertyKey, t: f64) {
        if let Some(&index) = self.owners.get(&key) {
            self.children[index].set_property_elapsed(key, t);
        }
    }

    fn sync_triggers(&self, t: f64) {
        for child in &self.children {
            child.sync_triggers(t);
        }
    }

    fn validate(&self) -> Result<(), AnimationError> {
        self.children.iter().try_for_each(|child| child.validate())
    }
}
