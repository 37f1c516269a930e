//! # Scene 模块
//!
//! 演示场景：标题淡入、卡片滑入并显示说明文字、最后整体淡出。

use std::fmt;
use std::rc::Rc;

use anim_runtime::{
    AnimResult, AnimationGroup, AnimationNode, Color, CycleCount, Easing, Position, Property,
    StepAnimatorBuilder, Transform, Trigger, TriggerDirection,
};
use tracing::info;

/// 场景中的可动画属性
pub struct DemoScene {
    pub title: Rc<Property<Transform>>,
    pub card: Rc<Property<Transform>>,
    pub caption: Rc<Property<f32>>,
    pub accent: Rc<Property<Color>>,
}

impl DemoScene {
    pub fn new() -> Self {
        Self {
            title: Property::new(Transform::with_alpha(0.0)),
            card: Property::new(Transform {
                alpha: 0.0,
                ..Transform::at(-200.0, 0.0)
            }),
            caption: Property::new(0.0),
            accent: Property::new(Color::rgb(0.2, 0.2, 0.2)),
        }
    }

    /// 构建三个步骤
    ///
    /// 作者调用会把属性停在每一步的最终值，构建完成后由播放器写回起始状态。
    pub fn build_steps(&self) -> AnimResult<StepAnimatorBuilder> {
        let mut builder = StepAnimatorBuilder::new();

        // 第一步：标题淡入并轻微放大，强调色呼吸两次
        let mut step = builder.begin_step();
        let mut fade_in = AnimationNode::new(400.0).with_easing(Easing::EaseOut);
        fade_in.lerp_to(
            &self.title,
            Transform {
                scale: (1.1, 1.1).into(),
                ..Transform::default()
            },
        );
        step.add_animation(fade_in, Position::Absolute, 0.0)?;

        let mut pulse = AnimationNode::new(200.0)
            .with_cycles(CycleCount::Finite(2))
            .with_alternate(true)
            .with_easing(Easing::EaseInOutSine);
        pulse.bind(
            &self.accent,
            Color::rgb(0.2, 0.2, 0.2),
            Color::rgb(1.0, 0.6, 0.1),
        );
        step.add_animation(pulse, Position::PreviousStart, 0.0)?;
        step.end();

        // 第二步：卡片滑入，到位时显示说明文字
        let mut step = builder.begin_step();
        step.add_label("slide");
        let mut slide = AnimationNode::new(600.0).with_easing(Easing::EaseOutBounce);
        slide.lerp_to(&self.card, Transform::default());
        step.add_animation(slide, Position::label("slide"), 0.0)?;
        step.add_trigger(Trigger::snap(&self.caption, 1.0), Position::PreviousEnd, 0.0)?;
        step.add_trigger(
            Trigger::new(|direction| match direction {
                TriggerDirection::Forward => info!("说明文字出现"),
                TriggerDirection::Backward => info!("说明文字撤回"),
            }),
            Position::PreviousStart,
            0.0,
        )?;
        step.end();

        // 第三步：所有元素一起淡出
        let mut step = builder.begin_step();
        let mut fade_out = AnimationGroup::new();
        fade_out.add_lerp_properties(
            [
                (self.title.clone(), Transform::with_alpha(0.0)),
                (self.card.clone(), Transform::with_alpha(0.0)),
            ],
            300.0,
            Easing::EaseIn,
        );
        fade_out.add_lerp_properties([(self.caption.clone(), 0.0)], 150.0, Easing::Linear);
        step.add_animation(fade_out, Position::Absolute, 0.0)?;
        step.end();

        Ok(builder)
    }
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DemoScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title.get();
        let card = self.card.get();
        let accent = self.accent.get();
        write!(
            f,
            "title(alpha={:.2}, scale={:.2}) card(x={:.1}, alpha={:.2}) caption={:.2} accent=({:.2}, {:.2}, {:.2})",
            title.alpha,
            title.scale.x,
            card.position.x,
            card.alpha,
            self.caption.get(),
            accent.r,
            accent.g,
            accent.b,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_runtime::Scheduler;

    #[test]
    fn test_demo_steps_layout() {
        let scene = DemoScene::new();
        let builder = scene.build_steps().unwrap();
        assert_eq!(builder.step_count(), 3);
        assert_eq!(builder.step_duration(0), Some(400.0));
        assert_eq!(builder.step_duration(1), Some(600.0));
        assert_eq!(builder.step_start_time(2), Some(1000.0));
        assert_eq!(builder.master_duration(), 1300.0);
    }

    #[test]
    fn test_demo_initial_state() {
        let scene = DemoScene::new();
        let animator = scene
            .build_steps()
            .unwrap()
            .finalize(&Scheduler::new())
            .unwrap();

        animator.reset();
        insta::assert_snapshot!(
            scene.to_string(),
            @"title(alpha=0.00, scale=1.00) card(x=-200.0, alpha=0.00) caption=0.00 accent=(0.20, 0.20, 0.20)"
        );
    }

    #[test]
    fn test_demo_final_state() {
        let scene = DemoScene::new();
        let animator = scene
            .build_steps()
            .unwrap()
            .finalize(&Scheduler::new())
            .unwrap();

        animator.seek_master(animator.master_duration());
        insta::assert_snapshot!(
            scene.to_string(),
            @"title(alpha=0.00, scale=1.00) card(x=0.0, alpha=0.00) caption=0.00 accent=(0.20, 0.20, 0.20)"
        );
    }
}
