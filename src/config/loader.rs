//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NOVOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NOVOX_TTS__URL=http://tts-server:8000`
/// - `NOVOX_SEGMENT__TARGET_DURATION_SECONDS=60`
/// - `NOVOX_STORAGE__WORKSPACE_DIR=/data/workspace`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 2. 环境变量（最高优先级）
    // 前缀: NOVOX_
    // 层级分隔符: __ (双下划线)
    // 例如: NOVOX_TTS__URL=http://tts-server:8000
    builder = builder.add_source(
        Environment::with_prefix("NOVOX")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 3. 构建配置（默认值由各结构体的 serde default 提供）
    let config = builder.build()?;
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 4. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    // 关闭单说话人约束会产生混音片段，直接拒绝
    if !config.segment.strict_speaker_separation {
        return Err(ConfigError::ValidationError(
            "strict_speaker_separation cannot be disabled".to_string(),
        ));
    }

    match config.segment.script_family.as_str() {
        "cjk" | "alphabetic" => {}
        other => {
            return Err(ConfigError::ValidationError(format!(
                "Unknown script_family: {} (expected \"cjk\" or \"alphabetic\")",
                other
            )));
        }
    }

    if config.segment.target_duration_seconds <= 0.0 {
        return Err(ConfigError::ValidationError(
            "segment.target_duration_seconds must be positive".to_string(),
        ));
    }

    if config.synth.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "synth.max_concurrent must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!(
        "Segment Target: {:.0}s @ {} chars/s",
        config.segment.target_duration_seconds,
        config.segment.chars_per_second
    );
    tracing::info!("Script Family: {}", config.segment.script_family);
    tracing::info!("Workspace: {:?}", config.storage.workspace_dir);
    tracing::info!("Cache: {}", config.storage.cache_path);
    tracing::info!("Max Concurrent Synth: {}", config.synth.max_concurrent);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
