use serde::{Deserialize, Serialize};

/// 默认作用域类名模板
pub const DEFAULT_SCOPED_PATTERN: &str = "[name]_[local]_[hash]";

/// 样式表处理器配置
///
/// 唯一的配置项是有序的阶段列表，对应构建时的
/// `postcss.config` 插件列表。可以从 JSON 加载：
///
/// ```
/// use stylemap_core::{ProcessorConfig, StageConfig};
///
/// let config = ProcessorConfig::from_json(r#"{
///     "stages": [
///         { "name": "discard-empty" },
///         { "name": "css-modules", "pattern": "[local]_[hash]" }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(config.stages.len(), 2);
/// assert_eq!(config.stages[0], StageConfig::DiscardEmpty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,
}

/// 单个阶段的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum StageConfig {
    /// 作用域类名阶段，产出类名映射
    CssModules {
        #[serde(default = "default_pattern")]
        pattern: String,
    },
    /// 删除空规则
    DiscardEmpty,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
        }
    }
}

impl ProcessorConfig {
    /// 不包含任何阶段的配置：样式表原样解析、输出
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl StageConfig {
    pub fn css_modules() -> Self {
        StageConfig::CssModules {
            pattern: default_pattern(),
        }
    }
}

fn default_stages() -> Vec<StageConfig> {
    vec![StageConfig::css_modules()]
}

fn default_pattern() -> String {
    DEFAULT_SCOPED_PATTERN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_has_css_modules() {
        let config = ProcessorConfig::default();
        assert_eq!(config.stages, vec![StageConfig::css_modules()]);
    }

    #[test]
    fn test_missing_stages_uses_default() {
        let config = ProcessorConfig::from_json("{}").unwrap();
        assert_eq!(config, ProcessorConfig::default());
    }

    #[test]
    fn test_pattern_defaults_when_omitted() {
        let config = ProcessorConfig::from_json(r#"{"stages":[{"name":"css-modules"}]}"#).unwrap();
        assert_eq!(
            config.stages[0],
            StageConfig::CssModules {
                pattern: DEFAULT_SCOPED_PATTERN.to_string()
            }
        );
    }

    #[test]
    fn test_stage_order_preserved() {
        let config = ProcessorConfig {
            stages: vec![StageConfig::DiscardEmpty, StageConfig::css_modules()],
        };
        let json = config.to_json().unwrap();
        let parsed = ProcessorConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let result = ProcessorConfig::from_json(r#"{"stages":[{"name":"autoprefixer"}]}"#);
        assert!(result.is_err());
    }
}
