use stylemap_core::StageMessage;
use swc_core::css::ast::{ComponentValue, Rule, SimpleBlock, Stylesheet};

use crate::error::ProcessError;
use crate::stage::{CssStage, StageInput};

/// 删除空规则阶段
///
/// 删除块为空的规则和 at-rule（包括 `@media` 内嵌套的规则），
/// 删除后变空的外层块也一并删除。没有块的 at-rule（如 `@import`）保留。
pub struct DiscardEmpty;

impl DiscardEmpty {
    pub const NAME: &'static str = "discard-empty";
}

impl CssStage for DiscardEmpty {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &self,
        stylesheet: &mut Stylesheet,
        _input: &StageInput<'_>,
        messages: &mut Vec<StageMessage>,
    ) -> Result<(), ProcessError> {
        let mut removed = 0;
        stylesheet.rules.retain_mut(|rule| match rule {
            Rule::QualifiedRule(rule) => retain_block(&mut rule.block, &mut removed),
            Rule::AtRule(rule) => match &mut rule.block {
                Some(block) => retain_block(block, &mut removed),
                None => true,
            },
            _ => true,
        });

        if removed > 0 {
            messages.push(StageMessage::warning(
                Self::NAME,
                format!("removed {} empty rule(s)", removed),
            ));
        }
        Ok(())
    }
}

/// 先清理块内嵌套规则，再判断块本身是否为空
fn retain_block(block: &mut SimpleBlock, removed: &mut usize) -> bool {
    block.value.retain_mut(|value| match value {
        ComponentValue::QualifiedRule(rule) => retain_block(&mut rule.block, removed),
        ComponentValue::AtRule(rule) => match &mut rule.block {
            Some(block) => retain_block(block, removed),
            None => true,
        },
        _ => true,
    });

    if block.value.is_empty() {
        *removed += 1;
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::emit_css;
    use crate::parse::parse_stylesheet;
    use stylemap_core::MessageKind;
    use std::path::Path;

    fn run_stage(source: &str) -> (String, Vec<StageMessage>) {
        let path = Path::new("a.sss");
        let mut stylesheet = parse_stylesheet(source, path).unwrap();
        let mut messages = vec![];
        DiscardEmpty
            .run(&mut stylesheet, &StageInput { path }, &mut messages)
            .unwrap();
        (emit_css(&stylesheet).unwrap(), messages)
    }

    #[test]
    fn test_removes_empty_rule() {
        let (css, messages) = run_stage(".empty {} .full { color: red }");

        println!("{}", css);
        assert!(!css.contains(".empty"));
        assert!(css.contains(".full"));
        assert_eq!(
            messages[0].kind,
            MessageKind::Warning("removed 1 empty rule(s)".to_string())
        );
    }

    #[test]
    fn test_removes_media_left_empty() {
        let (css, _) = run_stage("@media print { .a {} } .b { color: red }");

        assert!(!css.contains("@media"));
        assert!(css.contains(".b"));
    }

    #[test]
    fn test_keeps_blockless_at_rule() {
        let (css, messages) = run_stage("@import url(\"base.css\"); .a { color: red }");

        assert!(css.contains("@import"));
        assert!(messages.is_empty());
    }
}
