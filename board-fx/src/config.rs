//! # Config 模块
//!
//! 效果配置与看板（soundboard）配置模型。
//!
//! ## 容错原则
//!
//! 效果配置不做运行时校验：缺失或类型不对的字段一律回退到 schema 默认值，
//! 只在 debug 级别记录。触发路径上永远不因为配置问题报错。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// 全局缩放字段名
pub const GLOBAL_SCALE_KEY: &str = "globalScale";
/// 寿命字段名
pub const LIFE_MS_KEY: &str = "lifeMs";
/// 单个实例寿命上限（毫秒）
pub const MAX_LIFE_MS: f32 = 60_000.0;
/// 数量类字段上限（设备缩放之前）
pub const MAX_COUNT: usize = 500;

/// 看板配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    /// 文件读取失败
    #[error("看板配置读取失败: {path}: {message}")]
    Io { path: String, message: String },
    /// JSON 解析失败
    #[error("看板配置解析失败: {0}")]
    Parse(String),
}

/// 合并后的效果配置
///
/// 由区域的 `animationCfg` 浅覆盖 `globalScale` 得到，原样传给效果。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectConfig {
    fields: Map<String, Value>,
}

impl EffectConfig {
    /// 空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从任意 JSON 值构造；非对象视为空配置
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                fields: map.clone(),
            },
            Value::Null => Self::default(),
            other => {
                debug!(value = %other, "animationCfg 不是对象，按空配置处理");
                Self::default()
            }
        }
    }

    /// 区域配置 + 全局缩放的浅合并
    pub fn merged(animation_cfg: &Value, global_scale: f32) -> Self {
        Self::from_value(animation_cfg).with(GLOBAL_SCALE_KEY, global_scale)
    }

    /// 设置字段（构建器风格）
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// 设置字段
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// 原始字段值
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// 读取有限数值，缺失或非法时返回 `None`
    fn finite(&self, key: &str) -> Option<f32> {
        let value = self.fields.get(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Some(v as f32),
            _ => {
                debug!(key, value = %value, "配置字段无法解析为数值，使用默认值");
                None
            }
        }
    }

    /// 数值字段
    pub fn number(&self, key: &str, default: f32) -> f32 {
        self.finite(key).unwrap_or(default)
    }

    /// 数量字段：四舍五入，负数视为 0，上限 [`MAX_COUNT`]
    pub fn count(&self, key: &str, default: usize) -> usize {
        match self.finite(key) {
            Some(v) if v <= 0.0 => 0,
            Some(v) => (v.round() as usize).min(MAX_COUNT),
            None => default.min(MAX_COUNT),
        }
    }

    /// 全局缩放：缺失、非法或不为正时为 1
    pub fn global_scale(&self) -> f32 {
        match self.finite(GLOBAL_SCALE_KEY) {
            Some(v) if v > 0.0 => v,
            _ => 1.0,
        }
    }

    /// 寿命（毫秒）：负数回退默认值，上限 [`MAX_LIFE_MS`]，0 合法
    pub fn life_ms(&self, default: f32) -> f32 {
        match self.finite(LIFE_MS_KEY) {
            Some(v) if v >= 0.0 => v.min(MAX_LIFE_MS),
            Some(v) => {
                debug!(life_ms = v, "lifeMs 为负数，使用默认值");
                default
            }
            None => default,
        }
    }
}

impl From<Map<String, Value>> for EffectConfig {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// 音频样本引用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleRef {
    /// 样本地址（相对资源根目录或绝对路径）
    pub url: String,
    /// 增益（dB）
    #[serde(default)]
    pub gain_db: f32,
}

/// 单个触发区域的配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    /// 效果 key（注册表中的外键）
    #[serde(default)]
    pub animation_key: String,
    /// 效果参数（原样透传）
    #[serde(default)]
    pub animation_cfg: Value,
    /// 可选的音频样本，触发时随机挑一个
    #[serde(default)]
    pub samples: Vec<SampleRef>,
}

impl ZoneConfig {
    /// 合并全局缩放后的效果配置
    pub fn effect_config(&self, global_scale: f32) -> EffectConfig {
        EffectConfig::merged(&self.animation_cfg, global_scale)
    }
}

/// 看板配置（4x4 区域 + 全局缩放）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    #[serde(default)]
    pub global_scale: Option<f32>,
}

impl BoardConfig {
    /// 从 JSON 文本解析
    pub fn from_json(content: &str) -> Result<Self, BoardError> {
        serde_json::from_str(content).map_err(|e| BoardError::Parse(e.to_string()))
    }

    /// 从文件读取并解析
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, BoardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BoardError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// 按索引获取区域
    pub fn zone(&self, index: usize) -> Option<&ZoneConfig> {
        self.zones.get(index)
    }

    /// 实际生效的全局缩放（缺失、0 或非法时为 1）
    pub fn effective_global_scale(&self) -> f32 {
        match self.global_scale {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========== EffectConfig ==========

    #[test]
    fn test_number_defaults_when_absent() {
        let cfg = EffectConfig::new();
        assert_eq!(cfg.number("radius", 60.0), 60.0);
        assert_eq!(cfg.global_scale(), 1.0);
        assert_eq!(cfg.life_ms(600.0), 600.0);
    }

    #[test]
    fn test_number_reads_numeric_strings() {
        let cfg = EffectConfig::from_value(&json!({ "radius": "42" }));
        assert_eq!(cfg.number("radius", 60.0), 42.0);
    }

    #[test]
    fn test_malformed_field_falls_back() {
        let cfg = EffectConfig::from_value(&json!({ "radius": [1, 2], "lifeMs": "soon" }));
        assert_eq!(cfg.number("radius", 60.0), 60.0);
        assert_eq!(cfg.life_ms(600.0), 600.0);
    }

    #[test]
    fn test_non_object_config_is_empty() {
        let cfg = EffectConfig::from_value(&json!("burst"));
        assert_eq!(cfg, EffectConfig::new());
    }

    #[test]
    fn test_global_scale_zero_or_negative_is_one() {
        for bad in [json!(0), json!(-2.0), json!(null), json!("x")] {
            let cfg = EffectConfig::new().with(GLOBAL_SCALE_KEY, bad);
            assert_eq!(cfg.global_scale(), 1.0);
        }
        let cfg = EffectConfig::new().with(GLOBAL_SCALE_KEY, 2.5);
        assert_eq!(cfg.global_scale(), 2.5);
    }

    #[test]
    fn test_life_ms_rules() {
        let neg = EffectConfig::new().with(LIFE_MS_KEY, -100);
        assert_eq!(neg.life_ms(600.0), 600.0);

        let zero = EffectConfig::new().with(LIFE_MS_KEY, 0);
        assert_eq!(zero.life_ms(600.0), 0.0);

        let huge = EffectConfig::new().with(LIFE_MS_KEY, 1e9);
        assert_eq!(huge.life_ms(600.0), MAX_LIFE_MS);
    }

    #[test]
    fn test_count_rules() {
        let cfg = EffectConfig::from_value(&json!({ "a": 3.6, "b": -4, "c": 1e6 }));
        assert_eq!(cfg.count("a", 1), 4);
        assert_eq!(cfg.count("b", 1), 0);
        assert_eq!(cfg.count("c", 1), MAX_COUNT);
        assert_eq!(cfg.count("missing", 7), 7);
    }

    #[test]
    fn test_merge_overlays_global_scale() {
        let cfg = EffectConfig::merged(&json!({ "radius": 40, "globalScale": 9 }), 2.0);
        assert_eq!(cfg.number("radius", 60.0), 40.0);
        assert_eq!(cfg.global_scale(), 2.0);
    }

    // ========== BoardConfig ==========

    #[test]
    fn test_board_parse_camel_case() {
        let board = BoardConfig::from_json(
            r#"{
                "globalScale": 1.5,
                "zones": [
                    { "animationKey": "burst", "animationCfg": { "radius": 40 },
                      "samples": [{ "url": "kick.wav", "gainDb": -3 }] },
                    { "animationKey": "ripple" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(board.zones.len(), 2);
        assert_eq!(board.effective_global_scale(), 1.5);
        let zone = board.zone(0).unwrap();
        assert_eq!(zone.animation_key, "burst");
        assert_eq!(zone.samples[0].gain_db, -3.0);
        assert!(board.zone(1).unwrap().samples.is_empty());
        assert!(board.zone(5).is_none());
    }

    #[test]
    fn test_board_global_scale_fallback() {
        let board = BoardConfig::from_json(r#"{ "globalScale": null, "zones": [] }"#).unwrap();
        assert_eq!(board.effective_global_scale(), 1.0);

        let board = BoardConfig::from_json(r#"{ "globalScale": 0 }"#).unwrap();
        assert_eq!(board.effective_global_scale(), 1.0);
    }

    #[test]
    fn test_board_parse_error() {
        let err = BoardConfig::from_json("{ zones: ").unwrap_err();
        assert!(matches!(err, BoardError::Parse(_)));
    }
}
