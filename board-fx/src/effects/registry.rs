//! 效果注册表

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use tracing::warn;

use super::{EffectDefinition, EffectSchema};

static BUILTIN: LazyLock<EffectRegistry> = LazyLock::new(|| {
    EffectRegistry::new(vec![
        super::burst::DEFINITION,
        super::ripple::DEFINITION,
        super::confetti::DEFINITION,
        super::waves::DEFINITION,
        super::spiral::DEFINITION,
        super::pulse::DEFINITION,
        super::lightning::DEFINITION,
        super::flower::DEFINITION,
        super::tornado::DEFINITION,
        super::firework::DEFINITION,
        super::nebula::DEFINITION,
        super::matrix::DEFINITION,
        super::galaxy::DEFINITION,
        super::geometric::DEFINITION,
        super::plasma::DEFINITION,
        super::crystal::DEFINITION,
    ])
});

/// 对外公开的效果描述（不含 `run`）
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EffectSummary {
    pub key: &'static str,
    pub name: &'static str,
    pub schema: EffectSchema,
}

/// 按 key 查找效果定义
#[derive(Debug)]
pub struct EffectRegistry {
    effects: Vec<EffectDefinition>,
    index: HashMap<&'static str, usize>,
}

impl EffectRegistry {
    /// 内置的 16 个效果
    pub fn builtin() -> &'static EffectRegistry {
        &BUILTIN
    }

    /// 由定义列表构造；重复的 key 以先出现的为准
    pub fn new(definitions: Vec<EffectDefinition>) -> Self {
        let mut effects = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());
        for def in definitions {
            if index.contains_key(def.key) {
                warn!(key = def.key, "效果 key 重复，忽略后注册的定义");
                continue;
            }
            index.insert(def.key, effects.len());
            effects.push(def);
        }
        Self { effects, index }
    }

    /// 查找效果，未知 key 返回 `None`
    pub fn get(&self, key: &str) -> Option<&EffectDefinition> {
        self.index.get(key).map(|&i| &self.effects[i])
    }

    /// 按注册顺序列出所有效果
    pub fn list(&self) -> Vec<EffectSummary> {
        self.effects
            .iter()
            .map(|def| EffectSummary {
                key: def.key,
                name: def.name,
                schema: def.schema,
            })
            .collect()
    }

    /// 按注册顺序遍历效果定义
    pub fn definitions(&self) -> impl Iterator<Item = &EffectDefinition> + '_ {
        self.effects.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.effects.iter().map(|def| def.key)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_sixteen_effects() {
        let registry = EffectRegistry::builtin();
        assert_eq!(registry.len(), 16);
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(keys[0], "burst");
        assert_eq!(keys[15], "crystal");
    }

    #[test]
    fn test_get_unknown_is_none() {
        assert!(EffectRegistry::builtin().get("nope").is_none());
        assert!(EffectRegistry::builtin().get("").is_none());
    }

    #[test]
    fn test_snowflake_is_named_nebula() {
        let def = EffectRegistry::builtin().get("snowflake").unwrap();
        assert_eq!(def.name, "Nebula");
    }

    #[test]
    fn test_every_effect_declares_life_ms() {
        for def in EffectRegistry::builtin().list() {
            assert!(
                def.schema.default_life_ms().is_some(),
                "{} 缺少 lifeMs 默认值",
                def.key
            );
        }
    }

    #[test]
    fn test_list_json_excludes_run() {
        let list = EffectRegistry::builtin().list();
        let json = serde_json::to_value(&list).unwrap();
        let first = &json[0];
        assert_eq!(first["key"], "burst");
        assert_eq!(first["name"], "Burst");
        assert_eq!(first["schema"]["radius"]["default"], 60.0);
        assert!(first.get("run").is_none());
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let mut burst = super::super::burst::DEFINITION;
        burst.name = "Other";
        let registry = EffectRegistry::new(vec![super::super::burst::DEFINITION, burst]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("burst").unwrap().name, "Burst");
    }
}
