//! # Easing 模块
//!
//! 缓动函数库。输入是单个周期内的归一化进度，输出是写入属性插值的 alpha。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 缓入（Cubic）
    EaseIn,
    /// 缓出（Cubic）
    EaseOut,
    /// 缓入缓出（Cubic）
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 弹性缓出（会越过 1.0）
    EaseOutElastic,
    /// 弹跳缓出
    EaseOutBounce,
    /// 阶跃：进度到达 1.0 之前始终为 0
    Step,
}

impl Easing {
    /// 计算缓动值
    ///
    /// `t` 会先被限制在 `[0, 1]`，NaN 视为 0。
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseOutElastic => ease_out_elastic(t),
            Easing::EaseOutBounce => ease_out_bounce(t),
            Easing::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn ease_out_elastic(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        let c4 = (2.0 * PI) / 3.0;
        2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.25), 0.25);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_endpoints_are_fixed() {
        let all = [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
            Easing::EaseInSine,
            Easing::EaseOutSine,
            Easing::EaseInOutSine,
            Easing::EaseOutElastic,
            Easing::EaseOutBounce,
            Easing::Step,
        ];
        for easing in all {
            assert!(easing.apply(0.0).abs() < 1e-4, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_ease_in_out_midpoint() {
        let mid = Easing::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_clamp_and_nan() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
        assert_eq!(easing.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_step_holds_until_end() {
        assert_eq!(Easing::Step.apply(0.99), 0.0);
        assert_eq!(Easing::Step.apply(1.0), 1.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Easing::EaseOutBounce).unwrap();
        assert_eq!(json, "\"ease_out_bounce\"");
        let back: Easing = serde_json::from_str("\"ease_in_out_sine\"").unwrap();
        assert_eq!(back, Easing::EaseInOutSine);
    }
}
