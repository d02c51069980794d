use std::path::Path;

use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap};
use swc_core::css::ast::Stylesheet;
use swc_core::css::parser::parse_file;
use swc_core::css::parser::parser::ParserConfig;

use crate::error::ProcessError;

/// 使用 swc_css_parser 解析样式表文本
///
/// 可恢复的解析错误同样视为失败：处理器会把输出写回源文件，
/// 带着错误继续只会把损坏的内容固化到磁盘上。
pub fn parse_stylesheet(source: &str, path: &Path) -> Result<Stylesheet, ProcessError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        source.to_string(),
    );

    let mut errors = vec![];
    let stylesheet = parse_file::<Stylesheet>(&fm, None, parser_config(), &mut errors)
        .map_err(|e| ProcessError::Parse {
            path: path.to_path_buf(),
            message: format!("{:?}", e),
        })?;

    if !errors.is_empty() {
        return Err(ProcessError::Parse {
            path: path.to_path_buf(),
            message: format!("{:?}", errors),
        });
    }

    Ok(stylesheet)
}

/// 开启 css modules 语法，`:global(...)` / `:local(...)` 会被解析为选择器
fn parser_config() -> ParserConfig {
    ParserConfig {
        css_modules: true,
        ..Default::default()
    }
}
