//! # Part 模块
//!
//! 时间轴片段：一个动画或触发器 + 解析后的 `[start, end)` 区间。

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::Trigger;
use crate::animation::Animation;
use crate::property::PropertyKey;

/// 片段的锚定规则
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Position {
    /// 从时间轴起点算起
    Absolute,
    /// 上一个片段的开始时间
    PreviousStart,
    /// 上一个片段的结束时间
    #[default]
    PreviousEnd,
    /// 某个命名标签的时间
    Label(String),
}

impl Position {
    /// 锚定到命名标签
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label(name.into())
    }
}

/// 片段载荷：动画与触发器二选一
pub(crate) enum Payload {
    Animation(Rc<dyn Animation>),
    Trigger(Trigger),
}

impl Payload {
    pub(crate) fn duration(&self) -> f64 {
        match self {
            Payload::Animation(animation) => animation.duration(),
            Payload::Trigger(_) => 0.0,
        }
    }

    pub(crate) fn property_keys(&self) -> Vec<PropertyKey> {
        match self {
            Payload::Animation(animation) => animation.property_keys(),
            Payload::Trigger(trigger) => trigger.property_key().into_iter().collect(),
        }
    }

    pub(crate) fn kind(&self) -> PartKind {
        match self {
            Payload::Animation(_) => PartKind::Animation,
            Payload::Trigger(_) => PartKind::Trigger,
        }
    }
}

/// 时间轴片段
pub(crate) struct Part {
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) payload: Payload,
    /// 回调触发器是否处于“已越过”状态
    pub(crate) fired: Cell<bool>,
}

impl Part {
    pub(crate) fn new(start: f64, payload: Payload) -> Self {
        let end = start + payload.duration();
        Self {
            start,
            end,
            payload,
            fired: Cell::new(false),
        }
    }

    pub(crate) fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// 是否与区间 `[start, end)` 冲突
    ///
    /// 零长度片段落在对方的 `[start, end)` 内即算冲突，恰好位于对方终点则不算；
    /// 两个零长度片段之间不冲突。
    pub(crate) fn conflicts_with(&self, start: f64, end: f64) -> bool {
        if start == end {
            return self.start <= start && start < self.end;
        }
        if self.start == self.end {
            return start <= self.start && self.start < end;
        }
        self.start < end && start < self.end
    }

    /// 把时间轴时间换算为片段内时间，两端钳制
    pub(crate) fn local_time(&self, t: f64) -> f64 {
        if t >= self.end {
            self.payload.duration()
        } else if t <= self.start {
            0.0
        } else {
            t - self.start
        }
    }
}

/// 片段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Animation,
    Trigger,
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartKind::Animation => write!(f, "animation"),
            PartKind::Trigger => write!(f, "trigger"),
        }
    }
}

/// 片段摘要（用于界面与调试）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartInfo {
    /// 插入顺序
    pub index: usize,
    pub kind: PartKind,
    pub start: f64,
    pub end: f64,
}

impl fmt::Display for PartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} [{}, {})",
            self.index, self.kind, self.start, self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger_part(start: f64) -> Part {
        Part::new(start, Payload::Trigger(Trigger::new(|_| {})))
    }

    #[test]
    fn test_conflicts() {
        let mut part = trigger_part(100.0);
        part.end = 200.0;

        assert!(part.conflicts_with(150.0, 250.0));
        assert!(part.conflicts_with(50.0, 101.0));
        assert!(!part.conflicts_with(200.0, 300.0));
        assert!(!part.conflicts_with(0.0, 100.0));
        // 零长度
        assert!(part.conflicts_with(150.0, 150.0));
        assert!(part.conflicts_with(100.0, 100.0));
        assert!(!part.conflicts_with(200.0, 200.0));
    }

    #[test]
    fn test_zero_length_part_conflicts() {
        let point = trigger_part(50.0);
        assert!(point.conflicts_with(0.0, 100.0));
        assert!(point.conflicts_with(50.0, 100.0));
        assert!(!point.conflicts_with(0.0, 50.0));
        assert!(!point.conflicts_with(50.0, 50.0));
    }

    #[test]
    fn test_part_info_display() {
        let info = PartInfo {
            index: 2,
            kind: PartKind::Animation,
            start: 150.0,
            end: 250.5,
        };
        assert_eq!(info.to_string(), "#2 animation [150, 250.5)");
    }
}
