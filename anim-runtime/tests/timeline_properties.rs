//! # 时间轴行为集成测试
//!
//! 从公共 API 验证确定性、钳制、排列规则、分步拼接、触发器与重叠检查。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anim_runtime::{
    Animation, AnimationGroup, AnimationNode, CycleCount, Easing, PlayState, Playable, Position,
    Property, Scheduler, StepAnimatorBuilder, Timeline, TimelineError, Trigger, TriggerDirection,
};

fn lerp(property: &Rc<Property<f32>>, target: f32, duration: f64) -> AnimationNode {
    let mut node = AnimationNode::new(duration);
    node.lerp_to(property, target);
    node
}

/// 乱序设置时间，结果只取决于当前时间
#[test]
fn test_determinism_out_of_order() {
    let prop = Property::new(0.0_f32);
    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&prop, 100.0, 1000.0), Position::Absolute, 0.0)
        .unwrap();

    timeline.set_elapsed(1000.0);
    assert_eq!(prop.get(), 100.0);
    timeline.set_elapsed(250.0);
    assert_eq!(prop.get(), 25.0);

    for t in [900.0, 0.0, 500.0, 250.0] {
        timeline.set_elapsed(t);
    }
    assert_eq!(prop.get(), 25.0);
}

/// 越界时间与端点结果相同
#[test]
fn test_clamping() {
    let prop = Property::new(0.0_f32);
    let node = lerp(&prop, 100.0, 200.0).with_easing(Easing::EaseInOut);

    node.set_elapsed(-50.0);
    let below = prop.get();
    node.set_elapsed(0.0);
    assert_eq!(prop.get(), below);

    node.set_elapsed(1e9);
    let above = prop.get();
    node.set_elapsed(200.0);
    assert_eq!(prop.get(), above);
    assert_eq!(above, 100.0);
}

/// A(absolute, 0) -> B(previous-end, 50) -> C(previous-start, 0)
#[test]
fn test_sequencing() {
    let a = Property::new(0.0_f32);
    let b = Property::new(0.0_f32);
    let c = Property::new(0.0_f32);

    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&a, 1.0, 100.0), Position::Absolute, 0.0)
        .unwrap();
    timeline
        .add_animation(lerp(&b, 1.0, 100.0), Position::PreviousEnd, 50.0)
        .unwrap();
    timeline
        .add_animation(lerp(&c, 1.0, 100.0), Position::PreviousStart, 0.0)
        .unwrap();

    let parts = timeline.parts();
    assert_eq!(parts[1].start, 150.0);
    assert_eq!(parts[2].start, 150.0);
    assert_eq!(timeline.duration(), 250.0);
}

#[test]
fn test_step_concatenation() {
    let mut builder = StepAnimatorBuilder::new();
    for duration in [100.0, 200.0, 150.0] {
        let prop = Property::new(0.0_f32);
        let mut step = builder.begin_step();
        step.add_animation(lerp(&prop, 1.0, duration), Position::Absolute, 0.0)
            .unwrap();
        step.end();
    }

    let animator = builder.finalize(&Scheduler::new()).unwrap();
    assert_eq!(animator.step_start_time(0), Some(0.0));
    assert_eq!(animator.step_start_time(1), Some(100.0));
    assert_eq!(animator.step_start_time(2), Some(300.0));
    assert_eq!(animator.master_duration(), 450.0);
}

/// 190 -> 210 一次越过 200 只触发一次；之后不越过则不再触发
#[test]
fn test_idempotent_trigger() {
    let prop = Property::new(0.0_f32);
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();

    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&prop, 1.0, 400.0), Position::Absolute, 0.0)
        .unwrap();
    timeline
        .add_trigger(
            Trigger::on_forward(move || counter.set(counter.get() + 1)),
            Position::Absolute,
            200.0,
        )
        .unwrap();

    timeline.set_elapsed(190.0);
    timeline.set_elapsed(210.0);
    assert_eq!(fired.get(), 1);
    timeline.set_elapsed(210.0);
    timeline.set_elapsed(250.0);
    assert_eq!(fired.get(), 1);
}

/// 回调触发器在向后越过时收到 Backward，之后可以再次向前触发
#[test]
fn test_trigger_directions() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();

    let mut timeline = Timeline::new();
    let prop = Property::new(0.0_f32);
    timeline
        .add_animation(lerp(&prop, 1.0, 100.0), Position::Absolute, 0.0)
        .unwrap();
    timeline
        .add_trigger(
            Trigger::new(move |direction| sink.borrow_mut().push(direction)),
            Position::Absolute,
            50.0,
        )
        .unwrap();

    timeline.set_elapsed(60.0);
    timeline.set_elapsed(40.0);
    timeline.set_elapsed(30.0);
    timeline.set_elapsed(70.0);
    assert_eq!(
        *log.borrow(),
        vec![
            TriggerDirection::Forward,
            TriggerDirection::Backward,
            TriggerDirection::Forward
        ]
    );
}

/// 快照触发器参与属性轨道，向后拖动时恢复之前的状态
#[test]
fn test_snap_trigger_restores_on_seek_back() {
    let visible = Property::new(0.0_f32);
    let mut timeline = Timeline::new();
    timeline
        .add_trigger(Trigger::snap(&visible, 1.0), Position::Absolute, 100.0)
        .unwrap();
    timeline
        .add_trigger(Trigger::snap(&visible, 0.5), Position::Absolute, 200.0)
        .unwrap();

    timeline.set_elapsed(150.0);
    assert_eq!(visible.get(), 1.0);
    timeline.set_elapsed(250.0);
    assert_eq!(visible.get(), 0.5);
    timeline.set_elapsed(50.0);
    assert_eq!(visible.get(), 0.0);
}

#[test]
fn test_overlap_rejected() {
    let prop = Property::new(0.0_f32);
    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&prop, 1.0, 100.0), Position::Absolute, 0.0)
        .unwrap();

    let err = timeline
        .add_animation(lerp(&prop, 2.0, 100.0), Position::Absolute, 50.0)
        .unwrap_err();
    assert!(matches!(err, TimelineError::Overlap { .. }));

    // 失败的添加不改变时间轴
    assert_eq!(timeline.part_count(), 1);
    assert_eq!(timeline.duration(), 100.0);
}

/// 跳变落在同一属性动画的起点与动画重叠；落在终点则合法
#[test]
fn test_snap_at_animation_start_rejected() {
    let prop = Property::new(0.0_f32);
    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&prop, 1.0, 100.0), Position::Absolute, 100.0)
        .unwrap();

    let err = timeline
        .add_trigger(Trigger::snap(&prop, 5.0), Position::Absolute, 100.0)
        .unwrap_err();
    assert!(matches!(err, TimelineError::Overlap { .. }));
    timeline
        .add_trigger(Trigger::snap(&prop, 5.0), Position::Absolute, 200.0)
        .unwrap();

    // 反过来先放跳变，再在同一时刻开始动画
    let other = Property::new(0.0_f32);
    let mut reversed = Timeline::new();
    reversed
        .add_trigger(Trigger::snap(&other, 5.0), Position::Absolute, 100.0)
        .unwrap();
    let err = reversed
        .add_animation(lerp(&other, 1.0, 100.0), Position::Absolute, 100.0)
        .unwrap_err();
    assert!(matches!(err, TimelineError::Overlap { .. }));
    assert_eq!(reversed.part_count(), 1);
}

/// 两个周期、往返播放，每周期 100
#[test]
fn test_cycle_alternate() {
    let prop = Property::new(0.0_f32);
    let mut node = AnimationNode::new(100.0)
        .with_cycles(CycleCount::Finite(2))
        .with_alternate(true);
    node.bind(&prop, 0.0, 1.0);
    assert_eq!(node.duration(), 200.0);

    node.set_elapsed(0.0);
    assert_eq!(prop.get(), 0.0);
    node.set_elapsed(100.0);
    assert_eq!(prop.get(), 1.0);
    node.set_elapsed(150.0);
    assert_eq!(prop.get(), 0.5);
    node.set_elapsed(199.0);
    assert!(prop.get() < 0.05);
    node.set_elapsed(200.0);
    assert_eq!(prop.get(), 0.0);
}

/// 嵌套：组放进时间轴，时间轴再放进时间轴
#[test]
fn test_nested_composition() {
    let x = Property::new(0.0_f32);
    let y = Property::new(0.0_f32);

    let mut group = AnimationGroup::new();
    group.add_lerp_properties([(x.clone(), 100.0), (y.clone(), 50.0)], 100.0, Easing::Linear);

    let mut inner = Timeline::new();
    inner.add_animation(group, Position::Absolute, 0.0).unwrap();

    let mut outer = Timeline::new();
    outer.add_label("intro");
    outer
        .add_animation(inner, Position::label("intro"), 100.0)
        .unwrap();

    outer.set_elapsed(150.0);
    assert_eq!(x.get(), 50.0);
    assert_eq!(y.get(), 25.0);

    outer.set_elapsed(0.0);
    assert_eq!(x.get(), 0.0);
}

/// 播放器在触发器经过时的完整链路
#[test]
fn test_playable_drives_timeline() {
    let scheduler = Scheduler::new();
    let prop = Property::new(0.0_f32);
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();

    let mut timeline = Timeline::new();
    timeline
        .add_animation(lerp(&prop, 100.0, 100.0), Position::Absolute, 0.0)
        .unwrap();
    timeline
        .add_trigger(Trigger::on_forward(move || flag.set(true)), Position::PreviousEnd, 0.0)
        .unwrap();

    let playable = Playable::new(Rc::new(timeline), &scheduler);
    playable.play();
    for _ in 0..4 {
        scheduler.tick(25.0);
    }
    assert_eq!(prop.get(), 100.0);
    assert!(fired.get());
    assert_eq!(playable.state(), PlayState::Stopped);
}
