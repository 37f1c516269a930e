//! # Config 模块
//!
//! 演示程序配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (anim.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use anim_runtime::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 引擎配置（播放与时钟）
    #[serde(default)]
    pub engine: EngineConfig,

    /// 最多运行的帧数
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,

    /// 每隔多少帧输出一次属性状态
    #[serde(default = "default_report_every")]
    pub report_every: u32,
}

fn default_max_frames() -> u32 {
    600
}

fn default_report_every() -> u32 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            max_frames: default_max_frames(),
            report_every: default_report_every(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在、解析失败或验证失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                return Self::default();
            }
        };

        match Self::from_json_str(&content) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从 JSON 文本解析并验证
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.engine.validate()?;
        if config.report_every == 0 {
            anyhow::bail!("report_every 必须大于 0");
        }
        Ok(config)
    }
}
