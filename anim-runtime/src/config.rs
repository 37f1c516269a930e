//! # Config 模块
//!
//! 播放与时钟的默认配置。
//!
//! 本模块只定义可序列化的配置类型与验证逻辑，不读写文件；
//! 配置文件的加载由宿主程序负责。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 新建播放器的默认传输设置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 调度器时钟
    #[serde(default)]
    pub clock: ClockConfig,
}

/// 播放配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// 播放速度倍率（负数表示倒放）
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// 是否循环播放
    #[serde(default)]
    pub repeat: bool,
}

/// 时钟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// 固定帧间隔（毫秒），供按固定频率驱动时钟的宿主使用
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,

    /// 单次 tick 的最大时间增量（毫秒）
    ///
    /// 宿主循环卡顿后的第一帧会被限制在这个值以内。
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            repeat: false,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_delta_ms: default_max_delta_ms(),
        }
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_frame_interval_ms() -> f64 {
    16.0
}

fn default_max_delta_ms() -> f64 {
    100.0
}

impl EngineConfig {
    /// 从 JSON 文本解析并验证
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化的 JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.playback.speed.is_finite() {
            return Err(ConfigError::Validation(format!(
                "播放速度必须是有限数: {}",
                self.playback.speed
            )));
        }

        if !(self.clock.frame_interval_ms.is_finite() && self.clock.frame_interval_ms > 0.0) {
            return Err(ConfigError::Validation(format!(
                "帧间隔必须大于 0: {}",
                self.clock.frame_interval_ms
            )));
        }

        if self.clock.max_delta_ms.is_nan() || self.clock.max_delta_ms < self.clock.frame_interval_ms
        {
            return Err(ConfigError::Validation(format!(
                "最大时间增量 {} 不能小于帧间隔 {}",
                self.clock.max_delta_ms, self.clock.frame_interval_ms
            )));
        }

        Ok(())
    }
}
