pub mod context;
pub mod error;
pub mod resolve;
pub mod rewriter;

use std::path::PathBuf;

use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::source_map::{DefaultSourceMapGenConfig, SourceMapGenConfig};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, Globals, SourceMap, GLOBALS};
use swc_core::ecma::ast::*;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as CodegenConfig, Emitter};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use swc_core::ecma::visit::VisitMutWith;

// Re-exports
pub use context::{RewrittenStylesheet, TransformContext};
pub use error::TransformError;
pub use resolve::{is_stylesheet, resolve_stylesheet_path, sibling_css_specifier, STYLESHEET_SUFFIX};
pub use rewriter::StylesheetImportRewriter;
pub use stylemap_core::{ClassNameMap, ProcessorConfig, StageConfig};
pub use stylemap_css::StylesheetProcessor;

/// 转换选项
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// 是否生成源码映射（默认 false）
    ///
    /// 开启后 `TransformResult.source_map` 包含 JSON 格式的 source map，
    /// 内联对象会映射回处理后的 CSS 文件。
    pub source_map: bool,
}

/// 转换结果
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// 转换后的源码
    pub code: String,
    /// JSON 格式的 source map（仅当 `TransformOptions.source_map == true` 时生成）
    pub source_map: Option<String>,
    /// 被替换的样式表引用，按遍历顺序排列
    pub stylesheets: Vec<RewrittenStylesheet>,
}

/// 转换 JS/TS 模块源码
///
/// 遍历 AST，把 `import * as css from './a.sss'` 和 `require('./a.sss')`
/// 替换为内联的类名映射对象，并在文件顶部注入 `import './a.css'`。
///
/// 被引用的样式表会经过 `processor` 处理并就地写回。
/// 单个样式表处理失败只会让对应的引用保持原样，不会中断整个文件的转换。
///
/// # 参数
///
/// - `source`: 源码字符串
/// - `filename`: 文件路径（用于选择语法，以及解析相对样式表路径）
/// - `processor`: 本次构建使用的样式表处理器
/// - `options`: 转换选项
///
/// # 示例
///
/// ```no_run
/// use stylemap_transform::{transform_module, StylesheetProcessor, TransformOptions};
///
/// let source = r#"
///     import * as css from './typography.sss';
///     export const title = css.header1;
/// "#;
///
/// let processor = StylesheetProcessor::default();
/// let result = transform_module(source, "src/Typography.tsx", &processor, TransformOptions::default()).unwrap();
/// println!("Code:\n{}", result.code);
/// println!("Stylesheets: {:?}", result.stylesheets);
/// ```
pub fn transform_module(
    source: &str,
    filename: &str,
    processor: &StylesheetProcessor,
    options: TransformOptions,
) -> Result<TransformResult, TransformError> {
    let syntax = syntax_for(filename);

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Real(PathBuf::from(filename)).into(),
        source.to_string(),
    );

    // 解析（保留注释）
    let comments = SingleThreadedComments::default();
    let mut errors = vec![];
    let mut module = parse_file_as_module(&fm, syntax, EsVersion::latest(), Some(&comments), &mut errors)
        .map_err(|e| TransformError::Parse {
            filename: filename.to_string(),
            message: format!("{:?}", e),
        })?;

    if !errors.is_empty() {
        return Err(TransformError::Parse {
            filename: filename.to_string(),
            message: format!("{:?}", errors),
        });
    }

    // 遍历并替换
    let mut ctx = TransformContext::new(filename, processor).with_source_map(cm.clone());
    module.visit_mut_with(&mut StylesheetImportRewriter::new(&mut ctx));

    // 输出代码（携带注释）
    let (code, source_map) = GLOBALS.set(&Globals::new(), || {
        let source_map = options.source_map.then(|| StylesheetSourceMapConfig {
            stylesheets: ctx.stylesheets(),
        });
        emit_module(&cm, &module, Some(&comments), source_map)
    })?;

    Ok(TransformResult {
        code,
        source_map,
        stylesheets: ctx.into_stylesheets(),
    })
}

/// 根据文件名选择语法
fn syntax_for(filename: &str) -> Syntax {
    if filename.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })
    } else if filename.ends_with(".ts") || filename.ends_with(".mts") || filename.ends_with(".cts") {
        Syntax::Typescript(TsSyntax {
            tsx: false,
            ..Default::default()
        })
    } else {
        // .jsx / .js 默认支持 JSX
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    }
}

/// source map 配置：被替换的样式表以处理后的内容写入 `sourcesContent`
#[derive(Clone, Copy)]
struct StylesheetSourceMapConfig<'a> {
    stylesheets: &'a [RewrittenStylesheet],
}

impl SourceMapGenConfig for StylesheetSourceMapConfig<'_> {
    fn file_name_to_source(&self, f: &FileName) -> String {
        DefaultSourceMapGenConfig.file_name_to_source(f)
    }

    fn inline_sources_content(&self, f: &FileName) -> bool {
        match f {
            FileName::Real(path) => self.stylesheets.iter().any(|s| &s.path == path),
            _ => DefaultSourceMapGenConfig.inline_sources_content(f),
        }
    }
}

/// 使用 SWC codegen 输出 JS/TS 模块代码，按需生成 source map
fn emit_module(
    cm: &Lrc<SourceMap>,
    module: &Module,
    comments: Option<&SingleThreadedComments>,
    source_map: Option<StylesheetSourceMapConfig<'_>>,
) -> Result<(String, Option<String>), TransformError> {
    let mut buf = vec![];
    let mut mappings = vec![];
    {
        let writer = JsWriter::new(
            cm.clone(),
            "\n",
            &mut buf,
            source_map.is_some().then_some(&mut mappings),
        );
        let mut emitter = Emitter {
            cfg: CodegenConfig::default().with_target(EsVersion::latest()),
            cm: cm.clone(),
            comments: comments.map(|c| c as &dyn swc_core::common::comments::Comments),
            wr: writer,
        };
        emitter
            .emit_module(module)
            .map_err(|e| TransformError::Codegen(format!("{:?}", e)))?;
    }
    let code = String::from_utf8(buf)?;

    let Some(config) = source_map else {
        return Ok((code, None));
    };

    let map = cm.build_source_map(&mappings, None, config);
    let mut json = vec![];
    map.to_writer(&mut json)
        .map_err(|e| TransformError::SourceMap(e.to_string()))?;

    Ok((code, Some(String::from_utf8(json)?)))
}
