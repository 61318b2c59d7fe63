use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// 应用配置 (仅批处理程序使用，匹配引擎本身无配置)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// 0 表示使用 rayon 默认线程数
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig {
                input: PathBuf::from("match_jobs.json"),
                output: PathBuf::from("match_reports.json"),
                format: OutputFormat::Json,
                workers: 0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 默认值 < matcher.toml (可选) < MATCHER__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Some("matcher"))
    }

    /// 只读取环境变量，如 MATCHER__RUNNER__INPUT
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// 只含默认值的构建器
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = AppConfig::default();
        Config::builder()
            .set_default("runner.input", defaults.runner.input.to_string_lossy().to_string())?
            .set_default("runner.output", defaults.runner.output.to_string_lossy().to_string())?
            .set_default("runner.format", "json")?
            .set_default("runner.workers", defaults.runner.workers as i64)?
            .set_default("logging.level", defaults.logging.level)
    }

    fn build(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("MATCHER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
