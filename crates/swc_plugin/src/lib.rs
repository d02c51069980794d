use std::cell::RefCell;

use stylemap_core::ProcessorConfig;
use stylemap_css::StylesheetProcessor;
use stylemap_transform::{RewrittenStylesheet, StylesheetImportRewriter, TransformContext};
use swc_core::ecma::ast::Program;
use swc_core::ecma::visit::VisitMutWith;
use swc_core::plugin::metadata::TransformPluginMetadataContextKind;
use swc_core::plugin::{plugin_transform, proxies::TransformPluginProgramMetadata};
use tracing::error;

thread_local! {
    /// 插件实例存活期间共享的处理器，按配置区分
    ///
    /// 同一次构建中多个文件引用同一个样式表时，只有第一次会处理并写回，
    /// 之后复用记录下来的结果。
    static BUILD_PROCESSOR: RefCell<Option<(ProcessorConfig, StylesheetProcessor)>> =
        const { RefCell::new(None) };
}

/// SWC 插件入口
///
/// 插件配置即处理器配置（JSON），例如：
///
/// ```json
/// ["swc_plugin", { "stages": [{ "name": "css-modules" }] }]
/// ```
///
/// 宿主的 SourceMap 不对插件开放，插件模式下内联对象不携带指向 CSS 的 span。
#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = plugin_config(metadata.get_transform_plugin_config());
    let filename = metadata
        .get_context(&TransformPluginMetadataContextKind::Filename)
        .unwrap_or_default();

    transform_program(&mut program, &filename, config);
    program
}

/// 用共享处理器改写一个文件，返回被替换的样式表引用
fn transform_program(
    program: &mut Program,
    filename: &str,
    config: ProcessorConfig,
) -> Vec<RewrittenStylesheet> {
    with_build_processor(config, |processor| {
        let mut ctx = TransformContext::new(filename, processor);
        program.visit_mut_with(&mut StylesheetImportRewriter::new(&mut ctx));
        ctx.into_stylesheets()
    })
}

/// 取出与 `config` 对应的处理器，配置变化时重新创建
fn with_build_processor<R>(config: ProcessorConfig, f: impl FnOnce(&StylesheetProcessor) -> R) -> R {
    BUILD_PROCESSOR.with(|cell| {
        let mut slot = cell.borrow_mut();
        if !matches!(slot.as_ref(), Some((current, _)) if *current == config) {
            *slot = None;
        }

        let (_, processor) = slot.get_or_insert_with(|| {
            let processor = StylesheetProcessor::new(&config);
            (config, processor)
        });
        f(processor)
    })
}

/// 解析插件配置，非法配置记录错误后退回默认配置
fn plugin_config(raw: Option<String>) -> ProcessorConfig {
    match raw {
        Some(raw) if !raw.trim().is_empty() => ProcessorConfig::from_json(&raw).unwrap_or_else(|err| {
            error!(error = %err, "invalid plugin config, using default stages");
            ProcessorConfig::default()
        }),
        _ => ProcessorConfig::default(),
    }
}
