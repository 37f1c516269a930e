//! # Timeline 模块
//!
//! 时间轴：按插入顺序排列的片段，每个片段包装一个动画或一个触发器，
//! 开始时间由锚定规则相对上一个片段（或命名标签）解析。
//!
//! ## 属性轨道
//!
//! 每个属性维护一条按时间排序的轨道。给定时间 `t`，每个属性只由轨道中的
//! 一个片段负责，因此同一属性上的片段不允许重叠，重叠在构建时直接报错。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut timeline = Timeline::new();
//! timeline.add_animation(fade_in, Position::Absolute, 0.0)?;
//! timeline.add_label("title");
//! timeline.add_animation(slide, Position::PreviousEnd, 50.0)?;
//! timeline.add_trigger(Trigger::snap(&caption, 1.0), Position::label("title"), 0.0)?;
//!
//! timeline.set_elapsed(120.0);
//! ```

mod part;
mod track;
mod trigger;

pub use part::{PartInfo, PartKind, Position};
pub use trigger::{Trigger, TriggerDirection};

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::animation::Animation;
use crate::error::TimelineError;
use crate::property::PropertyKey;
use part::{Part, Payload};
use track::PropertyTrack;

/// 时间轴
#[derive(Default)]
pub struct Timeline {
    /// 片段（插入顺序）
    parts: Vec<Part>,
    /// 属性轨道（首次出现顺序）
    tracks: Vec<PropertyTrack>,
    /// 属性 -> 轨道索引
    track_index: HashMap<PropertyKey, usize>,
    /// 标签 -> 时间
    labels: HashMap<String, f64>,
    /// 所有片段结束时间的最大值
    duration: f64,
    /// 上一次同步触发器的时间，只用于决定触发器的调用顺序
    last_synced: Cell<Option<f64>>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("parts", &self.parts.len())
            .field("tracks", &self.tracks.len())
            .field("labels", &self.labels)
            .field("duration", &self.duration)
            .finish()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 构建 ==========

    /// 添加动画片段，返回片段索引
    pub fn add_animation<A: Animation + 'static>(
        &mut self,
        animation: A,
        position: Position,
        offset: f64,
    ) -> Result<usize, TimelineError> {
        self.add_shared(Rc::new(animation), position, offset)
    }

    /// 添加共享的动画片段（例如嵌套的时间轴）
    pub fn add_shared(
        &mut self,
        animation: Rc<dyn Animation>,
        position: Position,
        offset: f64,
    ) -> Result<usize, TimelineError> {
        animation
            .validate()
            .map_err(|source| TimelineError::InvalidAnimation {
                part: self.parts.len(),
                source,
            })?;
        self.add_part(Payload::Animation(animation), &position, offset)
    }

    /// 添加触发器片段，返回片段索引
    pub fn add_trigger(
        &mut self,
        trigger: Trigger,
        position: Position,
        offset: f64,
    ) -> Result<usize, TimelineError> {
        self.add_part(Payload::Trigger(trigger), &position, offset)
    }

    /// 以当前总时长记录一个标签，返回标签时间
    ///
    /// 同名标签会被覆盖。
    pub fn add_label(&mut self, name: impl Into<String>) -> f64 {
        let name = name.into();
        debug!(label = %name, time = self.duration, "添加时间轴标签");
        self.labels.insert(name, self.duration);
        self.duration
    }

    fn resolve_start(&self, position: &Position, offset: f64) -> Result<f64, TimelineError> {
        if !offset.is_finite() {
            return Err(TimelineError::InvalidOffset { offset });
        }
        let (prev_start, prev_end) = self
            .parts
            .last()
            .map(|part| (part.start, part.end))
            .unwrap_or((0.0, 0.0));

        let anchor = match position {
            Position::Absolute => 0.0,
            Position::PreviousStart => prev_start,
            Position::PreviousEnd => prev_end,
            Position::Label(name) => *self
                .labels
                .get(name)
                .ok_or_else(|| TimelineError::LabelNotFound {
                    label: name.clone(),
                })?,
        };
        Ok((anchor + offset).max(0.0))
    }

    fn add_part(
        &mut self,
        payload: Payload,
        position: &Position,
        offset: f64,
    ) -> Result<usize, TimelineError> {
        let start = self.resolve_start(position, offset)?;
        let part = Part::new(start, payload);
        let keys = part.payload.property_keys();

        // 先检查所有轨道，失败时时间轴保持不变
        for key in &keys {
            if let Some(&track) = self.track_index.get(key)
                && let Some(existing) =
                    self.tracks[track].find_conflict(&self.parts, part.start, part.end)
            {
                return Err(TimelineError::Overlap {
                    property: *key,
                    existing_start: existing.start,
                    existing_end: existing.end,
                    start: part.start,
                    end: part.end,
                });
            }
        }

        let index = self.parts.len();
        debug!(
            index,
            kind = %part.payload.kind(),
            start = part.start,
            end = part.end,
            properties = keys.len(),
            "添加时间轴片段"
        );
        self.duration = self.duration.max(part.end);
        self.parts.push(part);

        for key in keys {
            let track = match self.track_index.get(&key) {
                Some(&track) => track,
                None => {
                    self.tracks.push(PropertyTrack::new(key));
                    self.track_index.insert(key, self.tracks.len() - 1);
                    self.tracks.len() - 1
                }
            };
            self.tracks[track].insert(&self.parts, index);
        }

        Ok(index)
    }

    // ========== 查询 ==========

    /// 标签时间
    pub fn label_time(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    /// 片段数量
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// 片段摘要（插入顺序）
    pub fn parts(&self) -> Vec<PartInfo> {
        self.parts
            .iter()
            .enumerate()
            .map(|(index, part)| PartInfo {
                index,
                kind: part.payload.kind(),
                start: part.start,
                end: part.end,
            })
            .collect()
    }

    /// 某个属性轨道上的片段数量
    pub fn track_len(&self, key: PropertyKey) -> usize {
        self.track_index
            .get(&key)
            .map(|&track| self.tracks[track].len())
            .unwrap_or(0)
    }

    /// 可读的布局描述：每行一个片段，标签按时间排在最后
    pub fn layout(&self) -> String {
        let mut lines: Vec<String> = self.parts().iter().map(ToString::to_string).collect();

        let mut labels: Vec<(&String, &f64)> = self.labels.iter().collect();
        labels.sort_by(|a, b| a.1.total_cmp(b.1).then_with(|| a.0.cmp(b.0)));
        lines.extend(labels.into_iter().map(|(name, time)| format!("@{name} = {time}")));

        lines.push(format!("duration = {}", self.duration));
        lines.join("\n")
    }
}

impl Animation for Timeline {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn property_keys(&self) -> Vec<PropertyKey> {
        self.tracks.iter().map(|track| track.key).collect()
    }

    fn set_property_elapsed(&self, key: PropertyKey, t: f64) {
        let Some(&track) = self.track_index.get(&key) else {
            return;
        };
        let Some(index) = self.tracks[track].active(&self.parts, t) else {
            return;
        };

        let part = &self.parts[index];
        match &part.payload {
            Payload::Animation(animation) => {
                animation.set_property_elapsed(key, part.local_time(t));
            }
            Payload::Trigger(trigger) => trigger.apply_property(t >= part.start),
        }
    }

    fn sync_triggers(&self, t: f64) {
        let backward = self.last_synced.get().is_some_and(|last| t < last);
        self.last_synced.set(Some(t));

        // 向后拖动时逆序撤销，保证后触发的先撤销
        let sync = |part: &Part| match &part.payload {
            Payload::Trigger(trigger) if trigger.is_callback() => {
                let reached = t >= part.start;
                if reached != part.fired.get() {
                    part.fired.set(reached);
                    trigger.fire(if reached {
                        TriggerDirection::Forward
                    } else {
                        TriggerDirection::Backward
                    });
                }
            }
            Payload::Trigger(_) => {}
            Payload::Animation(animation) => animation.sync_triggers(t - part.start),
        };

        if backward {
            self.parts.iter().rev().for_each(sync);
        } else {
            self.parts.iter().for_each(sync);
        }
    }
}
