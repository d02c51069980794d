use swc_core::css::ast::Stylesheet;
use swc_core::css::codegen::{
    writer::basic::{BasicCssWriter, BasicCssWriterConfig, IndentType, LineFeed},
    CodeGenerator, CodegenConfig, Emit,
};

/// 写回磁盘时使用的排版：两空格缩进、LF 换行
fn writer_config() -> BasicCssWriterConfig {
    BasicCssWriterConfig {
        indent_type: IndentType::Space,
        indent_width: 2,
        linefeed: LineFeed::LF,
    }
}

/// 把阶段处理后的样式表序列化为文本
///
/// 结果既会覆盖原样式表文件，也会作为源码映射里的 CSS 内容，
/// 因此不压缩。同一棵树多次输出结果相同。
pub fn emit_css(stylesheet: &Stylesheet) -> Result<String, std::fmt::Error> {
    let mut css = String::new();
    CodeGenerator::new(
        &mut BasicCssWriter::new(&mut css, None, writer_config()),
        CodegenConfig { minify: false },
    )
    .emit(stylesheet)?;

    Ok(css)
}
