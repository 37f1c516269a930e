//! # Step 模块
//!
//! 分步动画：演示由若干个可以单独播放的步骤组成，每个步骤是一条时间轴，
//! 所有步骤首尾相接拼成一条可拖动的主时间轴。
//!
//! ## 构建阶段
//!
//! ```rust,ignore
//! let mut builder = StepAnimatorBuilder::new();
//!
//! let mut step = builder.begin_step();
//! step.add_animation(fade_in, Position::Absolute, 0.0)?;
//! step.end();
//!
//! let mut step = builder.begin_step();
//! step.add_animation(slide, Position::PreviousEnd, 0.0)?;
//! step.end();
//!
//! let animator = builder.finalize(&scheduler)?;
//! animator.play_step(1);
//! ```
//!
//! ## 播放阶段
//!
//! `play_step(i)` 先把主时间轴定位到第 `i` 步的起点，由主时间轴写好该步骤的初始状态，
//! 再只播放该步骤自己的时间轴。因此单独重放某一步不需要重跑之前的所有步骤。

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::animation::Animation;
use crate::error::{StepError, TimelineError};
use crate::playable::Playable;
use crate::property::RenderSink;
use crate::scheduler::Scheduler;
use crate::timeline::{Position, Timeline, Trigger};

/// 分步动画构建器
#[derive(Debug, Default)]
pub struct StepAnimatorBuilder {
    steps: Vec<Timeline>,
    /// 每个步骤在主时间轴上的开始时间（每次修改后立即重算）
    starts: Vec<f64>,
    master_duration: f64,
}

impl StepAnimatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一个新步骤
    pub fn begin_step(&mut self) -> StepHandle<'_> {
        let index = self.steps.len();
        self.steps.push(Timeline::new());
        self.recompute();
        debug!(step = index, "开始新步骤");
        StepHandle {
            builder: self,
            index,
        }
    }

    /// 继续编辑最后一个步骤
    pub fn current_step(&mut self) -> Result<StepHandle<'_>, StepError> {
        let index = self.steps.len().checked_sub(1).ok_or(StepError::StepNotFound {
            index: 0,
            count: 0,
        })?;
        self.step(index)
    }

    /// 继续编辑第 `index` 个步骤
    pub fn step(&mut self, index: usize) -> Result<StepHandle<'_>, StepError> {
        if index >= self.steps.len() {
            return Err(StepError::StepNotFound {
                index,
                count: self.steps.len(),
            });
        }
        Ok(StepHandle {
            builder: self,
            index,
        })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// 步骤时长，越界时为 `None`
    pub fn step_duration(&self, index: usize) -> Option<f64> {
        self.steps.get(index).map(|step| step.duration())
    }

    /// 步骤在主时间轴上的开始时间，越界时为 `None`
    pub fn step_start_time(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    /// 所有步骤的总时长
    pub fn master_duration(&self) -> f64 {
        self.master_duration
    }

    fn recompute(&mut self) {
        self.starts.clear();
        let mut start = 0.0;
        for step in &self.steps {
            self.starts.push(start);
            start += step.duration();
        }
        self.master_duration = start;
    }

    /// 结束构建：拼接主时间轴，为每个步骤和主时间轴各创建一个播放器
    pub fn finalize(self, scheduler: &Scheduler) -> Result<StepAnimator, StepError> {
        if self.steps.is_empty() {
            return Err(StepError::StepNotFound { index: 0, count: 0 });
        }

        let mut master = Timeline::new();
        let mut players = Vec::with_capacity(self.steps.len());
        for (step, timeline) in self.steps.into_iter().enumerate() {
            let timeline: Rc<dyn Animation> = Rc::new(timeline);
            master
                .add_shared(timeline.clone(), Position::PreviousEnd, 0.0)
                .map_err(|source| StepError::Timeline { step, source })?;
            players.push(Playable::new(timeline, scheduler));
        }

        debug!(
            steps = players.len(),
            duration = self.master_duration,
            "分步动画构建完成"
        );

        Ok(StepAnimator {
            master: Playable::new(Rc::new(master), scheduler),
            players,
            starts: self.starts,
            mode: Cell::new(Mode::Master),
            current: Cell::new(0),
        })
    }
}

/// 正在编辑的步骤
///
/// 所有修改都会立即更新构建器中的步骤时间。
pub struct StepHandle<'a> {
    builder: &'a mut StepAnimatorBuilder,
    index: usize,
}

impl StepHandle<'_> {
    /// 步骤索引
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn add_animation<A: Animation + 'static>(
        &mut self,
        animation: A,
        position: Position,
        offset: f64,
    ) -> Result<usize, StepError> {
        self.add_shared(Rc::new(animation), position, offset)
    }

    pub fn add_shared(
        &mut self,
        animation: Rc<dyn Animation>,
        position: Position,
        offset: f64,
    ) -> Result<usize, StepError> {
        let result = self.timeline().add_shared(animation, position, offset);
        self.finish(result)
    }

    pub fn add_trigger(
        &mut self,
        trigger: Trigger,
        position: Position,
        offset: f64,
    ) -> Result<usize, StepError> {
        let result = self.timeline().add_trigger(trigger, position, offset);
        self.finish(result)
    }

    pub fn add_label(&mut self, name: impl Into<String>) -> f64 {
        self.timeline().add_label(name)
    }

    /// 当前步骤时长
    pub fn duration(&self) -> f64 {
        self.builder.steps[self.index].duration()
    }

    /// 结束编辑，返回步骤索引
    pub fn end(self) -> usize {
        self.index
    }

    fn timeline(&mut self) -> &mut Timeline {
        &mut self.builder.steps[self.index]
    }

    fn finish(&mut self, result: Result<usize, TimelineError>) -> Result<usize, StepError> {
        let part = result.map_err(|source| StepError::Timeline {
            step: self.index,
            source,
        })?;
        self.builder.recompute();
        Ok(part)
    }
}

/// 当前由哪个播放器驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Master,
    Step,
}

/// 分步动画播放器
#[derive(Debug)]
pub struct StepAnimator {
    master: Playable,
    players: Vec<Playable>,
    starts: Vec<f64>,
    mode: Cell<Mode>,
    current: Cell<usize>,
}

impl StepAnimator {
    /// 设置所有播放器的渲染通知目标
    pub fn set_sink(&self, sink: Option<Rc<dyn RenderSink>>) {
        self.master.set_sink(sink.clone());
        for player in &self.players {
            player.set_sink(sink.clone());
        }
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.players.len() - 1)
    }

    // ========== 播放 ==========

    /// 只播放第 `index` 个步骤（越界时钳制）
    ///
    /// 重放时，步骤内晚于起点的回调触发器会先收到 `Backward` 再收到 `Forward`；
    /// 恰好位于步骤起点的触发器在定位到起点时已视为到达，重放不会再次触发。
    pub fn play_step(&self, index: usize) {
        let index = self.reset_step(index);
        debug!(step = index, "播放步骤");
        self.players[index].play();
    }

    /// 从头连续播放所有步骤
    pub fn play_master(&self) {
        self.stop();
        self.mode.set(Mode::Master);
        self.master.play();
    }

    pub fn play_next_step(&self) {
        self.play_step(self.current_step() + 1);
    }

    pub fn play_previous_step(&self) {
        self.play_step(self.current_step().saturating_sub(1));
    }

    /// 定位到第 `index` 个步骤的起点但不播放，返回钳制后的索引
    pub fn reset_step(&self, index: usize) -> usize {
        let index = self.clamp_index(index);
        self.stop();
        self.master.seek(self.starts[index]);
        self.players[index].seek(0.0);
        self.mode.set(Mode::Step);
        self.current.set(index);
        index
    }

    /// 回到主时间轴起点
    pub fn reset(&self) {
        self.seek_master(0.0);
    }

    /// 把主时间轴定位到 `t`（停止当前播放）
    pub fn seek_master(&self, t: f64) {
        self.stop();
        self.mode.set(Mode::Master);
        self.master.seek(t);
    }

    pub fn pause(&self) {
        self.active_player().pause();
    }

    pub fn resume(&self) {
        self.active_player().resume();
    }

    pub fn stop(&self) {
        self.master.stop();
        for player in &self.players {
            player.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.master.is_playing() || self.players.iter().any(Playable::is_playing)
    }

    fn active_player(&self) -> &Playable {
        match self.mode.get() {
            Mode::Master => &self.master,
            Mode::Step => &self.players[self.current.get()],
        }
    }

    // ========== 查询 ==========

    /// 当前步骤
    ///
    /// 连续播放时按主时间轴位置推算：恰好落在边界上的时间属于后一个步骤。
    pub fn current_step(&self) -> usize {
        match self.mode.get() {
            Mode::Step => self.current.get(),
            Mode::Master => {
                let t = self.master.elapsed();
                self.starts
                    .partition_point(|&start| start <= t)
                    .saturating_sub(1)
            }
        }
    }

    /// 在主时间轴上的位置
    pub fn master_elapsed(&self) -> f64 {
        match self.mode.get() {
            Mode::Master => self.master.elapsed(),
            Mode::Step => {
                let index = self.current.get();
                self.starts[index] + self.players[index].elapsed()
            }
        }
    }

    /// 主时间轴进度 `[0, 1]`，用于进度条
    pub fn step_progress(&self) -> f64 {
        let duration = self.master_duration();
        if duration <= 0.0 {
            return 1.0;
        }
        (self.master_elapsed() / duration).clamp(0.0, 1.0)
    }

    pub fn step_count(&self) -> usize {
        self.players.len()
    }

    pub fn step_start_time(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    pub fn step_duration(&self, index: usize) -> Option<f64> {
        self.players.get(index).map(Playable::duration)
    }

    pub fn master_duration(&self) -> f64 {
        self.master.duration()
    }

    /// 主时间轴播放器（例如调整速度或循环）
    pub fn master(&self) -> &Playable {
        &self.master
    }

    /// 某个步骤的播放器
    pub fn step_player(&self, index: usize) -> Option<&Playable> {
        self.players.get(index)
    }
}
