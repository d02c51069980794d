use std::path::{Path, PathBuf};

use stylemap_core::ClassNameMap;
use stylemap_css::StylesheetProcessor;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceFile, SourceMap};

/// 一次成功的样式表替换记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenStylesheet {
    /// 源码中书写的路径（如 `./a.sss`）
    pub specifier: String,
    /// 解析后的样式表路径
    pub path: PathBuf,
    /// 内联进源码的类名映射
    pub class_map: ClassNameMap,
}

/// 转换上下文，每个编译单元创建一个，转换结束后丢弃
///
/// 持有源文件路径、样式表处理器，以及遍历过程中需要提升到
/// 模块顶部的 side-effect import。
pub struct TransformContext<'a> {
    filename: PathBuf,
    processor: &'a StylesheetProcessor,
    /// 宿主的 SourceMap。提供时，处理后的 CSS 会注册为源文件，
    /// 替换节点的 span 指向其中的位置。
    source_map: Option<Lrc<SourceMap>>,
    /// 待提升的 side-effect 引用路径
    hoisted: Vec<String>,
    stylesheets: Vec<RewrittenStylesheet>,
}

impl<'a> TransformContext<'a> {
    pub fn new(filename: impl Into<PathBuf>, processor: &'a StylesheetProcessor) -> Self {
        Self {
            filename: filename.into(),
            processor,
            source_map: None,
            hoisted: Vec::new(),
            stylesheets: Vec::new(),
        }
    }

    pub fn with_source_map(mut self, cm: Lrc<SourceMap>) -> Self {
        self.source_map = Some(cm);
        self
    }

    /// 当前编译的源文件路径
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn processor(&self) -> &'a StylesheetProcessor {
        self.processor
    }

    /// 把处理后的 CSS 注册到 SourceMap，没有 SourceMap 时返回 None
    pub(crate) fn register_stylesheet_source(&self, path: &Path, css: &str) -> Option<Lrc<SourceFile>> {
        self.source_map.as_ref().map(|cm| {
            cm.new_source_file(FileName::Real(path.to_path_buf()).into(), css.to_string())
        })
    }

    /// 登记一个需要提升到文件顶部的 side-effect 引用
    ///
    /// 模块中生成 `import './a.css'`，脚本中生成 `require('./a.css')`。
    pub fn hoist_side_effect_import(&mut self, specifier: &str) {
        self.hoisted.push(specifier.to_string());
    }

    /// 取出已登记的引用路径，按登记顺序排列
    pub fn take_hoisted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.hoisted)
    }

    pub(crate) fn record(&mut self, stylesheet: RewrittenStylesheet) {
        self.stylesheets.push(stylesheet);
    }

    pub fn stylesheets(&self) -> &[RewrittenStylesheet] {
        &self.stylesheets
    }

    pub fn into_stylesheets(self) -> Vec<RewrittenStylesheet> {
        self.stylesheets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hoisted_imports_in_order() {
        let processor = StylesheetProcessor::default();
        let mut ctx = TransformContext::new("/src/App.tsx", &processor);
        ctx.hoist_side_effect_import("./a.css");
        ctx.hoist_side_effect_import("./b.css");

        assert_eq!(ctx.take_hoisted(), vec!["./a.css", "./b.css"]);

        // 取出后清空
        assert!(ctx.take_hoisted().is_empty());
    }

    #[test]
    fn test_register_source_without_source_map() {
        let processor = StylesheetProcessor::default();
        let ctx = TransformContext::new("/src/App.tsx", &processor);
        assert!(ctx
            .register_stylesheet_source(Path::new("/src/a.sss"), ".a{}")
            .is_none());
    }

    #[test]
    fn test_register_source_with_source_map() {
        let processor = StylesheetProcessor::default();
        let cm: Lrc<SourceMap> = Default::default();
        let ctx = TransformContext::new("/src/App.tsx", &processor).with_source_map(cm);

        let css = ".a { color: red }";
        let fm = ctx
            .register_stylesheet_source(Path::new("/src/a.sss"), css)
            .unwrap();
        assert_eq!((fm.end_pos - fm.start_pos).0 as usize, css.len());
    }
}
