//! # Property 模块
//!
//! 引擎与场景元素之间的边界。
//!
//! ## 核心概念
//!
//! - `AnimatableProperty`: 可动画属性的能力接口（快照 / 恢复 / 插值）
//! - `Property<T>`: 基于 `Lerp` 值的默认实现
//! - `PropertyKey`: 属性身份，由属性所在的 `Rc` 分配地址决定
//! - `RenderSink`: 每次时间变化后通知场景刷新
//!
//! 引擎从不分配或释放属性，只读写快照。属性类型由实现者决定，
//! 引擎内部不做任何类型分派。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Lerp;

/// 可动画属性接口
///
/// 方法都接收 `&self`：属性由场景元素持有，通过内部可变性修改，
/// 同一个属性可以同时被元素和动画节点引用。
pub trait AnimatableProperty: 'static {
    /// 不可变快照
    type Snapshot: Clone + fmt::Debug + 'static;

    /// 捕获当前值
    fn snapshot(&self) -> Self::Snapshot;

    /// 恢复到某个快照
    fn restore(&self, snapshot: &Self::Snapshot);

    /// 在两个快照之间就地插值
    fn interpolate(&self, from: &Self::Snapshot, to: &Self::Snapshot, alpha: f32);
}

/// 属性身份
///
/// 由 `Rc` 分配地址得到。动画节点持有属性的 `Rc`，
/// 因此在时间轴存活期间地址不会被复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(usize);

impl PropertyKey {
    /// 获取属性的键
    pub fn of<P: ?Sized>(property: &Rc<P>) -> Self {
        Self(Rc::as_ptr(property).cast::<()>() as usize)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property@{:#x}", self.0)
    }
}

/// 默认属性实现：包装单个可插值的值
#[derive(Debug, Default)]
pub struct Property<T: Lerp> {
    value: RefCell<T>,
}

impl<T: Lerp> Property<T> {
    /// 创建属性（返回共享句柄）
    pub fn new(value: T) -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(value),
        })
    }

    /// 获取当前值
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// 直接设置值（不经过动画）
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
    }
}

impl<T> AnimatableProperty for Property<T>
where
    T: Lerp + fmt::Debug + 'static,
{
    type Snapshot = T;

    fn snapshot(&self) -> T {
        self.get()
    }

    fn restore(&self, snapshot: &T) {
        self.set(snapshot.clone());
    }

    fn interpolate(&self, from: &T, to: &T, alpha: f32) {
        self.set(T::lerp(from, to, alpha));
    }
}

/// 场景刷新接口
///
/// 每次可能改变属性的时间更新之后调用，用于重新计算依赖属性的显示状态。
pub trait RenderSink {
    fn refresh(&self);
}

impl<F: Fn()> RenderSink for F {
    fn refresh(&self) {
        self()
    }
}

/// 已冻结的属性绑定（初始 / 最终快照都已确定）
pub(crate) trait Binding {
    fn key(&self) -> PropertyKey;

    /// 按 alpha 写入属性；0 与 1 直接恢复快照
    fn apply(&self, alpha: f32);
}

/// 只记录了初始值、等待提交最终值的绑定
pub(crate) trait PendingBinding {
    fn key(&self) -> PropertyKey;

    /// 捕获当前值作为最终值，返回冻结后的绑定
    fn commit(self: Box<Self>) -> Box<dyn Binding>;
}

/// 基于快照的插值绑定
pub(crate) struct SnapshotBinding<P: AnimatableProperty> {
    property: Rc<P>,
    initial: P::Snapshot,
    target: P::Snapshot,
}

impl<P: AnimatableProperty> SnapshotBinding<P> {
    pub(crate) fn new(property: Rc<P>, initial: P::Snapshot, target: P::Snapshot) -> Self {
        Self {
            property,
            initial,
            target,
        }
    }
}

impl<P: AnimatableProperty> Binding for SnapshotBinding<P> {
    fn key(&self) -> PropertyKey {
        PropertyKey::of(&self.property)
    }

    fn apply(&self, alpha: f32) {
        if alpha == 0.0 {
            self.property.restore(&self.initial);
        } else if alpha == 1.0 {
            self.property.restore(&self.target);
        } else {
            self.property
                .interpolate(&self.initial, &self.target, alpha);
        }
    }
}

/// 等待提交的绑定
pub(crate) struct InitialOnly<P: AnimatableProperty> {
    property: Rc<P>,
    initial: P::Snapshot,
}

impl<P: AnimatableProperty> InitialOnly<P> {
    pub(crate) fn capture(property: Rc<P>) -> Self {
        let initial = property.snapshot();
        Self { property, initial }
    }
}

impl<P: AnimatableProperty> PendingBinding for InitialOnly<P> {
    fn key(&self) -> PropertyKey {
        PropertyKey::of(&self.property)
    }

    fn commit(self: Box<Self>) -> Box<dyn Binding> {
        let target = self.property.snapshot();
        Box::new(SnapshotBinding::new(self.property, self.initial, target))
    }
}
