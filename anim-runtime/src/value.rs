//! # Value 模块
//!
//! 可插值的基础值类型。`Property<T>` 只要求 `T: Lerp`，
//! 宿主的场景元素可以直接用这些类型声明自己的可动画属性。

use serde::{Deserialize, Serialize};

/// 线性插值能力
pub trait Lerp: Clone {
    /// 返回 `from` 与 `to` 之间比例为 `t` 的值
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Lerp for f64 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t as f64
    }
}

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Lerp for Vec2 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            x: f32::lerp(&from.x, &to.x, t),
            y: f32::lerp(&from.y, &to.y, t),
        }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 变换状态
///
/// 元素的位置、缩放、旋转和透明度，作为一个整体插值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 位置偏移
    pub position: Vec2,
    /// 缩放因子
    pub scale: Vec2,
    /// 旋转角度（弧度）
    pub rotation: f32,
    /// 透明度 (0.0 - 1.0)
    pub alpha: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            scale: Vec2::one(),
            rotation: 0.0,
            alpha: 1.0,
        }
    }
}

impl Transform {
    /// 只有位置偏移的变换
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// 只有透明度的变换
    pub fn with_alpha(alpha: f32) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

impl Lerp for Transform {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            position: Vec2::lerp(&from.position, &to.position, t),
            scale: Vec2::lerp(&from.scale, &to.scale, t),
            rotation: f32::lerp(&from.rotation, &to.rotation, t),
            alpha: f32::lerp(&from.alpha, &to.alpha, t),
        }
    }
}

/// RGBA 颜色，分量范围 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

impl Lerp for Color {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            r: f32::lerp(&from.r, &to.r, t),
            g: f32::lerp(&from.g, &to.g, t),
            b: f32::lerp(&from.b, &to.b, t),
            a: f32::lerp(&from.a, &to.a, t),
        }
    }
}
