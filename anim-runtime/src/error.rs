//! # Error 模块
//!
//! 定义 anim-runtime 中使用的错误类型。
//!
//! 只有 **构建期** 错误会以 `Err` 形式返回；播放期的越界时间、越界步骤索引
//! 一律被钳制（clamp），不会产生错误。

use thiserror::Error;

use crate::property::PropertyKey;

/// 动画节点 / 动画组构建错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 属性已记录初始值，但尚未提交最终值
    #[error("属性 {property} 尚未提交最终状态（缺少 commit_final）")]
    UncommittedProperty { property: PropertyKey },

    /// 无效的时长
    #[error("无效的动画时长 {duration}：必须是非负有限数")]
    InvalidDuration { duration: f64 },
}

/// 时间轴构建错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// 同一属性上的两个片段时间区间重叠
    #[error(
        "属性 {property} 的片段时间重叠：已有 [{existing_start}, {existing_end})，新增 [{start}, {end})"
    )]
    Overlap {
        property: PropertyKey,
        existing_start: f64,
        existing_end: f64,
        start: f64,
        end: f64,
    },

    /// 锚点标签不存在
    #[error("标签 '{label}' 未定义")]
    LabelNotFound { label: String },

    /// 载荷本身不合法
    #[error("片段 #{part} 的动画无效: {source}")]
    InvalidAnimation {
        part: usize,
        #[source]
        source: AnimationError,
    },

    /// 无效的偏移量
    #[error("无效的偏移量 {offset}：必须是有限数")]
    InvalidOffset { offset: f64 },
}

/// 分步动画构建错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// 引用了不存在的步骤
    #[error("步骤 {index} 不存在，当前共有 {count} 个步骤")]
    StepNotFound { index: usize, count: usize },

    /// 时间轴错误（发生在某个步骤内）
    #[error("步骤 {step}: {source}")]
    Timeline {
        step: usize,
        #[source]
        source: TimelineError,
    },
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 反序列化失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// anim-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// 动画错误
    #[error("动画错误: {0}")]
    Animation(#[from] AnimationError),

    /// 时间轴错误
    #[error("时间轴错误: {0}")]
    Timeline(#[from] TimelineError),

    /// 分步动画错误
    #[error("分步动画错误: {0}")]
    Step(#[from] StepError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
