//! # Track 模块
//!
//! 属性轨道：写同一属性的片段按开始时间排序，片段之间不允许重叠。

use super::part::Part;
use crate::property::PropertyKey;

pub(crate) struct PropertyTrack {
    pub(crate) key: PropertyKey,
    /// 片段索引，按开始时间排序；开始时间相同时按插入顺序
    parts: Vec<usize>,
}

impl PropertyTrack {
    pub(crate) fn new(key: PropertyKey) -> Self {
        Self {
            key,
            parts: Vec::new(),
        }
    }

    /// 找出与 `[start, end)` 冲突的已有片段
    pub(crate) fn find_conflict<'a>(
        &self,
        parts: &'a [Part],
        start: f64,
        end: f64,
    ) -> Option<&'a Part> {
        self.parts
            .iter()
            .map(|&index| &parts[index])
            .find(|part| part.conflicts_with(start, end))
    }

    /// 按开始时间插入片段
    pub(crate) fn insert(&mut self, parts: &[Part], index: usize) {
        let start = parts[index].start;
        let at = self.parts.partition_point(|&i| parts[i].start <= start);
        self.parts.insert(at, index);
    }

    /// 时间 `t` 时负责该属性的片段
    ///
    /// 优先取包含 `t` 的片段；否则取最近一个已经开始的片段（停在它的结束状态）；
    /// `t` 早于所有片段时取第一个片段（停在它的初始状态）。
    pub(crate) fn active(&self, parts: &[Part], t: f64) -> Option<usize> {
        let mut active = *self.parts.first()?;
        for &index in &self.parts {
            let part = &parts[index];
            if part.start > t {
                break;
            }
            if part.contains(t) {
                return Some(index);
            }
            active = index;
        }
        Some(active)
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }
}
