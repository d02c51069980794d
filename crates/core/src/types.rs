use indexmap::IndexMap;

/// 类名映射：样式表中书写的逻辑类名 -> 生成的作用域类名
///
/// 使用 IndexMap 保证迭代顺序与类名在样式表中首次出现的顺序一致，
/// 这样内联出来的对象字面量属性顺序是稳定的。
pub type ClassNameMap = IndexMap<String, String>;

/// 处理阶段产出的消息
///
/// 每个阶段都可以向消息列表追加内容，处理器在流水线结束后
/// 从中查找类名映射。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMessage {
    /// 产出该消息的阶段名（如 "css-modules"）
    pub stage: String,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// 作用域命名阶段导出的类名映射
    ExportTokens(ClassNameMap),
    /// 非致命的提示信息
    Warning(String),
}

impl StageMessage {
    pub fn export_tokens(stage: impl Into<String>, tokens: ClassNameMap) -> Self {
        Self {
            stage: stage.into(),
            kind: MessageKind::ExportTokens(tokens),
        }
    }

    pub fn warning(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            kind: MessageKind::Warning(message.into()),
        }
    }

    /// 如果该消息来自指定阶段且携带类名映射，返回映射
    pub fn tokens_from(&self, stage: &str) -> Option<&ClassNameMap> {
        match &self.kind {
            MessageKind::ExportTokens(tokens) if self.stage == stage => Some(tokens),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_from_matching_stage() {
        let mut tokens = ClassNameMap::new();
        tokens.insert("header1".to_string(), "a_header1_x1y2".to_string());
        let msg = StageMessage::export_tokens("css-modules", tokens.clone());

        assert_eq!(msg.tokens_from("css-modules"), Some(&tokens));
        assert_eq!(msg.tokens_from("discard-empty"), None);
    }

    #[test]
    fn test_warning_has_no_tokens() {
        let msg = StageMessage::warning("css-modules", "nothing to do");
        assert_eq!(msg.tokens_from("css-modules"), None);
    }
}
