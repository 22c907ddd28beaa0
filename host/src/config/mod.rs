//! # Config 模块
//!
//! 宿主配置（`config.json`）。字段缺失时取默认值，整个文件缺失时
//! 使用默认配置；命令行参数在 `main` 中覆盖文件中的值。
//!
//! ```json
//! {
//!   "assets_root": "assets",
//!   "window": { "width": 1024, "height": 768, "title": "Soundboard" },
//!   "board": { "path": "board.json", "poll_secs": 5.0, "chrome_height": 56.0 },
//!   "audio": { "master_volume": 0.8 },
//!   "debug": { "show_grid": true }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;
use tracing::{info, warn};

use board_fx::stage::DEFAULT_MAX_LIVE_INSTANCES;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 资源根目录（样本 url 相对于此目录）
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub board: BoardSettings,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// 窗口
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

/// 看板与渲染表面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// 看板文件
    #[serde(default = "default_board_path")]
    pub path: PathBuf,

    /// 看板文件轮询间隔（秒）
    #[serde(default = "default_poll_secs")]
    pub poll_secs: f32,

    /// 顶部工具栏高度（逻辑像素），从渲染视口中扣除
    #[serde(default = "default_chrome_height")]
    pub chrome_height: f32,

    /// 同时存活的效果实例上限
    #[serde(default = "default_max_live_instances")]
    pub max_live_instances: usize,
}

/// 音频
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 主音量 (0.0 - 1.0)
    #[serde(default = "default_master_volume")]
    pub master_volume: f32,

    #[serde(default)]
    pub muted: bool,
}

/// 调试选项
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// 强制按移动端档位运行
    pub force_mobile: bool,
    /// 绘制 4x4 区域网格
    pub show_grid: bool,
    /// 模拟的 User-Agent（参与档位检测）
    pub user_agent: Option<String>,
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_board_path() -> PathBuf {
    PathBuf::from("board.json")
}

fn default_poll_secs() -> f32 {
    5.0
}

fn default_chrome_height() -> f32 {
    56.0
}

fn default_max_live_instances() -> usize {
    DEFAULT_MAX_LIVE_INSTANCES
}

fn default_master_volume() -> f32 {
    1.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            window: WindowConfig::default(),
            board: BoardSettings::default(),
            audio: AudioConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Soundboard".to_string(),
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            path: default_board_path(),
            poll_secs: default_poll_secs(),
            chrome_height: default_chrome_height(),
            max_live_instances: default_max_live_instances(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_master_volume(),
            muted: false,
        }
    }
}

impl BoardSettings {
    /// 轮询间隔，最短 100ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f32(self.poll_secs.max(0.1))
    }
}

impl AppConfig {
    /// 读取并解析配置文件
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 加载配置；文件缺失或损坏时回退到默认配置
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = ?path, "未找到配置文件，使用默认配置");
                Self::default()
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件不可用，使用默认配置");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 检查取值范围，返回第一个不合法的字段
    pub fn validate(&self) -> Result<(), ConfigError> {
        let volume = self.audio.master_volume;
        let board = &self.board;
        let checks = [
            (
                "audio.master_volume",
                (0.0..=1.0).contains(&volume),
                "必须在 0.0 - 1.0 之间",
            ),
            (
                "board.poll_secs",
                board.poll_secs.is_finite() && board.poll_secs > 0.0,
                "必须为正数",
            ),
            (
                "board.max_live_instances",
                board.max_live_instances > 0,
                "不能为 0",
            ),
            (
                "board.chrome_height",
                board.chrome_height.is_finite() && board.chrome_height >= 0.0,
                "不能为负",
            ),
            (
                "window",
                self.window.width > 0 && self.window.height > 0,
                "窗口尺寸不能为 0",
            ),
        ];

        match checks.into_iter().find(|(_, ok, _)| !ok) {
            Some((field, _, reason)) => Err(ConfigError::Invalid { field, reason }),
            None => Ok(()),
        }
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读取配置失败: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("写入配置失败: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("配置格式错误: {0}")]
    Format(#[from] serde_json::Error),
    #[error("配置项 {field} 无效: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.board.chrome_height, 56.0);
        assert_eq!(config.board.max_live_instances, 64);
        assert_eq!(config.board.poll_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: AppConfig = serde_json::from_str(
            r#"{ "board": { "poll_secs": 2.0 }, "debug": { "show_grid": true } }"#,
        )
        .unwrap();
        assert!(loaded.debug.show_grid);
        assert_eq!(loaded.board.poll_secs, 2.0);
        assert_eq!(loaded.board.path, PathBuf::from("board.json"));
        assert_eq!(loaded.window.title, "Soundboard");
        assert_eq!(loaded.audio.master_volume, 1.0);
    }

    #[test]
    fn test_validation_names_field() {
        let mut config = AppConfig::default();

        config.audio.master_volume = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "audio.master_volume", .. })
        ));
        config.audio.master_volume = 0.5;

        config.board.poll_secs = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "board.poll_secs", .. })
        ));
        config.board.poll_secs = 2.0;

        config.board.max_live_instances = 0;
        assert!(config.validate().is_err());
        config.board.max_live_instances = 8;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.window.title = "测试".to_string();
        config.debug.force_mobile = true;
        config.board.max_live_instances = 12;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path);
        assert_eq!(loaded.window.title, "测试");
        assert!(loaded.debug.force_mobile);
        assert_eq!(loaded.board.max_live_instances, 12);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(
            AppConfig::try_load(&path),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(AppConfig::load(&path).window.height, 768);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::try_load(&path),
            Err(ConfigError::Format(_))
        ));
        assert_eq!(AppConfig::load(&path).board.chrome_height, 56.0);
    }
}
