use std::path::Path;

use stylemap_core::{ScopedNaming, StageConfig, StageMessage};
use swc_core::css::ast::Stylesheet;

use crate::css_modules::CssModules;
use crate::discard_empty::DiscardEmpty;
use crate::error::ProcessError;

/// 阶段执行时可见的输入信息
pub struct StageInput<'a> {
    /// 正在处理的样式表路径
    pub path: &'a Path,
}

/// 样式表处理阶段
///
/// 每个阶段就地修改样式表 AST，并可以向 `messages` 追加消息。
/// 阶段应当是输入文本加固定配置的纯函数，处理器依赖这一点
/// 保证同样的输入两次处理得到同样的结果。
pub trait CssStage {
    /// 阶段名，同时也是其产出消息的 `stage` 字段
    fn name(&self) -> &str;

    fn run(
        &self,
        stylesheet: &mut Stylesheet,
        input: &StageInput<'_>,
        messages: &mut Vec<StageMessage>,
    ) -> Result<(), ProcessError>;
}

/// 根据配置创建内置阶段
pub fn build_stage(config: &StageConfig) -> Box<dyn CssStage> {
    match config {
        StageConfig::CssModules { pattern } => {
            Box::new(CssModules::new(ScopedNaming::new(pattern.clone())))
        }
        StageConfig::DiscardEmpty => Box::new(DiscardEmpty),
    }
}
