use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stylemap_core::{ClassNameMap, ProcessorConfig, StageMessage};
use tracing::debug;

use crate::css_modules::CssModules;
use crate::emit::emit_css;
use crate::error::ProcessError;
use crate::parse::parse_stylesheet;
use crate::stage::{build_stage, CssStage, StageInput};

/// 一次处理的完整结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// 处理后的 CSS 文本（也就是写回磁盘的内容）
    pub css: String,
    /// 各阶段产出的消息，按阶段顺序排列
    pub messages: Vec<StageMessage>,
}

impl ProcessOutput {
    /// 作用域命名阶段导出的类名映射；流水线中没有该阶段时为 None
    pub fn class_map(&self) -> Option<&ClassNameMap> {
        self.messages
            .iter()
            .find_map(|message| message.tokens_from(CssModules::NAME))
    }
}

/// 样式表处理器
///
/// 一个处理器实例对应一次构建。文件被处理后会就地覆盖，
/// 因此处理器记录本次构建中已经写回的文件，同一文件再次被引用时
/// 直接返回已记录的结果，不会对已处理的内容再次改名。
///
/// 不同处理器实例之间没有任何同步：两个构建同时处理同一个路径
/// 会在写文件时产生竞争。
pub struct StylesheetProcessor {
    stages: Vec<Box<dyn CssStage>>,
    /// 规范化路径 -> 本次构建中的处理结果
    processed: RefCell<IndexMap<PathBuf, ProcessOutput>>,
}

impl Default for StylesheetProcessor {
    fn default() -> Self {
        Self::new(&ProcessorConfig::default())
    }
}

impl StylesheetProcessor {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self::with_stages(config.stages.iter().map(build_stage).collect())
    }

    /// 使用自定义阶段列表创建处理器
    pub fn with_stages(stages: Vec<Box<dyn CssStage>>) -> Self {
        Self {
            stages,
            processed: RefCell::new(IndexMap::new()),
        }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// 处理样式表文件，返回类名映射
    ///
    /// 读取文件、执行全部阶段、把结果写回原路径。
    /// 没有作用域命名阶段时返回 `Ok(None)`。
    pub fn process(&self, path: &Path) -> Result<Option<ClassNameMap>, ProcessError> {
        Ok(self.process_file(path)?.class_map().cloned())
    }

    /// 与 `process` 相同，但返回包含 CSS 文本和全部消息的完整结果
    pub fn process_file(&self, path: &Path) -> Result<ProcessOutput, ProcessError> {
        let key = fs::canonicalize(path)
            .map_err(|e| ProcessError::file_access("resolve", path, e))?;

        if let Some(output) = self.processed.borrow().get(&key) {
            debug!(path = %key.display(), "stylesheet already processed in this build");
            return Ok(output.clone());
        }

        debug!(path = %key.display(), stages = ?self.stage_names(), "processing stylesheet");

        let source =
            fs::read_to_string(&key).map_err(|e| ProcessError::file_access("read", &key, e))?;
        let output = self.process_source(&source, &key)?;
        fs::write(&key, &output.css).map_err(|e| ProcessError::file_access("write", &key, e))?;

        self.processed.borrow_mut().insert(key, output.clone());
        Ok(output)
    }

    /// 只处理文本，不读写文件
    ///
    /// `path` 用于诊断信息和作用域命名。
    pub fn process_source(&self, source: &str, path: &Path) -> Result<ProcessOutput, ProcessError> {
        let mut stylesheet = parse_stylesheet(source, path)?;
        let input = StageInput { path };
        let mut messages = Vec::new();

        for stage in &self.stages {
            stage.run(&mut stylesheet, &input, &mut messages)?;
        }

        Ok(ProcessOutput {
            css: emit_css(&stylesheet)?,
            messages,
        })
    }

    /// 本次构建中已经处理过的文件，按处理顺序排列
    pub fn processed_files(&self) -> Vec<PathBuf> {
        self.processed.borrow().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discard_empty::DiscardEmpty;
    use stylemap_core::StageConfig;

    #[test]
    fn test_process_source_with_default_config() {
        let processor = StylesheetProcessor::default();
        let output = processor
            .process_source(".header1 { color: red }", Path::new("/src/a.sss"))
            .unwrap();

        let map = output.class_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map["header1"].starts_with("a_header1_"));
        assert!(output.css.contains(&format!(".{}", map["header1"])));
    }

    #[test]
    fn test_no_naming_stage_yields_none() {
        let processor = StylesheetProcessor::new(&ProcessorConfig {
            stages: vec![StageConfig::DiscardEmpty],
        });
        let output = processor
            .process_source(".a {} .b { color: red }", Path::new("a.sss"))
            .unwrap();

        assert!(output.class_map().is_none());
        assert!(!output.css.contains(".a"));
    }

    #[test]
    fn test_stage_order_follows_config() {
        let processor = StylesheetProcessor::with_stages(vec![
            Box::new(DiscardEmpty),
            Box::new(CssModules::default()),
        ]);
        assert_eq!(processor.stage_names(), vec!["discard-empty", "css-modules"]);

        // 空规则在命名阶段之前被删除，不会出现在映射中
        let output = processor
            .process_source(".gone {} .kept { color: red }", Path::new("a.sss"))
            .unwrap();
        let map = output.class_map().unwrap();
        assert!(map.contains_key("kept"));
        assert!(!map.contains_key("gone"));
    }

    #[test]
    fn test_process_source_is_pure() {
        let processor = StylesheetProcessor::default();
        let path = Path::new("/src/a.sss");
        let first = processor.process_source(".a { color: red }", path).unwrap();
        let second = processor.process_source(".a { color: red }", path).unwrap();

        assert_eq!(first, second);
        assert!(processor.processed_files().is_empty());
    }
}
