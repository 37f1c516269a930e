//! # Trigger 模块
//!
//! 一次性触发器：在时间轴的某个瞬间执行不插值的变更。
//!
//! - 回调触发器：时间向前越过触发点时以 `Forward` 调用一次，
//!   向后越过时以 `Backward` 调用一次，同方向重复越过不会再次调用
//! - 跳变触发器：把属性瞬间设为目标值，参与属性轨道解析，
//!   因此向后拖动时间轴会确定性地恢复跳变前的值

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::property::{AnimatableProperty, Binding, PropertyKey, SnapshotBinding};

/// 越过触发点的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerDirection {
    /// 时间从触发点之前到达或越过触发点
    Forward,
    /// 时间回到触发点之前
    Backward,
}

type Callback = Box<dyn FnMut(TriggerDirection)>;

enum TriggerKind {
    Callback(RefCell<Callback>),
    Snap(Box<dyn Binding>),
}

/// 一次性触发器
pub struct Trigger {
    kind: TriggerKind,
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TriggerKind::Callback(_) => f.write_str("Trigger::Callback"),
            TriggerKind::Snap(binding) => write!(f, "Trigger::Snap({})", binding.key()),
        }
    }
}

impl Trigger {
    /// 创建回调触发器，两个方向都会收到通知
    pub fn new(callback: impl FnMut(TriggerDirection) + 'static) -> Self {
        Self {
            kind: TriggerKind::Callback(RefCell::new(Box::new(callback))),
        }
    }

    /// 创建只关心向前越过的回调触发器
    pub fn on_forward(mut callback: impl FnMut() + 'static) -> Self {
        Self::new(move |direction| {
            if direction == TriggerDirection::Forward {
                callback();
            }
        })
    }

    /// 创建跳变触发器
    ///
    /// 以属性当前值作为跳变前状态，绑定后属性停留在 `target`。
    pub fn snap<P: AnimatableProperty>(property: &Rc<P>, target: P::Snapshot) -> Self {
        let before = property.snapshot();
        property.restore(&target);
        Self {
            kind: TriggerKind::Snap(Box::new(SnapshotBinding::new(
                property.clone(),
                before,
                target,
            ))),
        }
    }

    /// 跳变触发器写入的属性
    pub(crate) fn property_key(&self) -> Option<PropertyKey> {
        match &self.kind {
            TriggerKind::Snap(binding) => Some(binding.key()),
            TriggerKind::Callback(_) => None,
        }
    }

    /// 跳变触发器：按是否已到达触发点写入属性
    pub(crate) fn apply_property(&self, reached: bool) {
        if let TriggerKind::Snap(binding) = &self.kind {
            binding.apply(if reached { 1.0 } else { 0.0 });
        }
    }

    pub(crate) fn is_callback(&self) -> bool {
        matches!(self.kind, TriggerKind::Callback(_))
    }

    /// 调用回调
    pub(crate) fn fire(&self, direction: TriggerDirection) {
        if let TriggerKind::Callback(callback) = &self.kind {
            match callback.try_borrow_mut() {
                Ok(mut callback) => callback(direction),
                Err(_) => warn!(?direction, "触发器回调重入，本次调用被忽略"),
            }
        }
    }
}
