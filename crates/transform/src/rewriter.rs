use std::path::Path;

use stylemap_core::ClassNameMap;
use swc_core::common::{BytePos, SourceFile, Span, DUMMY_SP};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::{debug, error};

use crate::context::{RewrittenStylesheet, TransformContext};
use crate::resolve::{is_stylesheet, resolve_stylesheet_path, sibling_css_specifier};

/// 样式表 import 改写器，使用 SWC VisitMut 先序遍历 AST，
/// 把引用 `.sss` 样式表的 import / require 替换为内联的类名映射对象。
///
/// 支持两种写法：
/// - `import * as css from './a.sss'` → `var css = { "header1": "a_header1_x1y2" }`
/// - `require('./a.sss')`              → `{ "header1": "a_header1_x1y2" }`
///
/// 每次替换都会登记一个 `import './a.css'`，遍历结束后提升到文件顶部，
/// 保证处理后的样式仍然会被加载。
pub struct StylesheetImportRewriter<'a, 'p> {
    ctx: &'a mut TransformContext<'p>,
}

impl<'a, 'p> StylesheetImportRewriter<'a, 'p> {
    pub fn new(ctx: &'a mut TransformContext<'p>) -> Self {
        Self { ctx }
    }

    /// 处理静态 import，只有命名空间形式会被替换
    fn rewrite_import(&mut self, import: &ImportDecl) -> Option<Stmt> {
        let specifier = str_value(&import.src);
        if !is_stylesheet(&specifier) {
            return None;
        }

        // 只处理 "import * as css from './a.sss'"，具名导入的变量在下游会被改名
        let local = match import.specifiers.as_slice() {
            [ImportSpecifier::Namespace(ns)] if !import.type_only => ns.local.clone(),
            _ => {
                debug!(specifier = %specifier, "unsupported stylesheet import form, left as-is");
                return None;
            }
        };

        let object = self.inline_class_names(&specifier)?;

        // var css = { ... }
        Some(Stmt::Decl(Decl::Var(Box::new(VarDecl {
            span: import.span,
            ctxt: Default::default(),
            kind: VarDeclKind::Var,
            declare: false,
            decls: vec![VarDeclarator {
                span: import.span,
                name: Pat::Ident(BindingIdent {
                    id: local,
                    type_ann: None,
                }),
                init: Some(Box::new(Expr::Object(object))),
                definite: false,
            }],
        }))))
    }

    /// 解析路径、处理样式表、生成对象字面量并登记 side-effect import
    ///
    /// 处理失败时记录错误并返回 None，调用方保留原节点。
    fn inline_class_names(&mut self, specifier: &str) -> Option<ObjectLit> {
        let path = resolve_stylesheet_path(specifier, self.ctx.filename());

        let output = match self.ctx.processor().process_file(&path) {
            Ok(output) => output,
            Err(err) => {
                error!(
                    specifier = %specifier,
                    path = %path.display(),
                    error = %err,
                    "failed to generate class name mapping, import left untransformed"
                );
                return None;
            }
        };

        let Some(class_map) = output.class_map().cloned() else {
            error!(
                specifier = %specifier,
                path = %path.display(),
                "pipeline produced no class name mapping, import left untransformed"
            );
            return None;
        };

        let object = self.build_object(&path, &output.css, &class_map);

        self.ctx.hoist_side_effect_import(&sibling_css_specifier(specifier));
        self.ctx.record(RewrittenStylesheet {
            specifier: specifier.to_string(),
            path,
            class_map,
        });

        Some(object)
    }

    /// 构建 `{ "local": "generated", ... }`
    ///
    /// 有 SourceMap 时，对象的 span 覆盖处理后的 CSS 文件，
    /// 每个属性的 span 指向 CSS 中对应的 `.generated` 选择器。
    fn build_object(&self, path: &Path, css: &str, class_map: &ClassNameMap) -> ObjectLit {
        let source = self.ctx.register_stylesheet_source(path, css);

        let props = class_map
            .iter()
            .map(|(local, generated)| {
                let span = source
                    .as_ref()
                    .map(|fm| selector_span(fm, css, generated))
                    .unwrap_or(DUMMY_SP);

                PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: PropName::Str(create_str(local, span)),
                    value: Box::new(Expr::Lit(Lit::Str(create_str(generated, span)))),
                })))
            })
            .collect();

        ObjectLit {
            span: source
                .map(|fm| Span::new(fm.start_pos, fm.end_pos))
                .unwrap_or(DUMMY_SP),
            props,
        }
    }

    /// 把登记的 side-effect 引用插入到指令序言（"use strict" 等）之后
    fn flush_hoisted<T>(
        &mut self,
        body: &mut Vec<T>,
        create: fn(&str) -> T,
        is_directive: fn(&T) -> bool,
    ) {
        let hoisted = self.ctx.take_hoisted();
        if hoisted.is_empty() {
            return;
        }

        let at = body.iter().take_while(|item| is_directive(item)).count();
        body.splice(at..at, hoisted.iter().map(|specifier| create(specifier)));
    }
}

impl VisitMut for StylesheetImportRewriter<'_, '_> {
    fn visit_mut_module(&mut self, module: &mut Module) {
        module.visit_mut_children_with(self);
        self.flush_hoisted(&mut module.body, create_side_effect_import, |item| {
            matches!(item, ModuleItem::Stmt(stmt) if is_directive(stmt))
        });
    }

    fn visit_mut_script(&mut self, script: &mut Script) {
        script.visit_mut_children_with(self);
        self.flush_hoisted(&mut script.body, create_side_effect_require, is_directive);
    }

    fn visit_mut_module_item(&mut self, item: &mut ModuleItem) {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
            if let Some(stmt) = self.rewrite_import(import) {
                // 替换结果是叶子节点，不再向下遍历
                *item = ModuleItem::Stmt(stmt);
                return;
            }
        }

        item.visit_mut_children_with(self);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if let Some(specifier) = require_specifier(expr) {
            if is_stylesheet(&specifier) {
                if let Some(object) = self.inline_class_names(&specifier) {
                    *expr = Expr::Object(object);
                    return;
                }
            }
        }

        expr.visit_mut_children_with(self);
    }
}

/// 识别 `require('<path>')` 调用，返回路径
///
/// 参数可以是字符串字面量，也可以是无插值的模板字面量。
fn require_specifier(expr: &Expr) -> Option<String> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };

    match (callee.as_ref(), call.args.first()) {
        (Expr::Ident(ident), Some(ExprOrSpread { spread: None, expr: arg }))
            if &*ident.sym == "require" =>
        {
            match arg.as_ref() {
                Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
                Expr::Tpl(tpl) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => {
                    let raw: &str = &tpl.quasis[0].raw;
                    Some(raw.to_string())
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// 在处理后的 CSS 中查找 `.generated` 选择器的位置
fn selector_span(fm: &SourceFile, css: &str, generated: &str) -> Span {
    let needle = format!(".{}", generated);
    match css.find(&needle) {
        Some(offset) => {
            let lo = fm.start_pos + BytePos(offset as u32);
            Span::new(lo, lo + BytePos(needle.len() as u32))
        }
        None => DUMMY_SP,
    }
}

fn is_directive(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::Expr(ExprStmt { expr, .. }) if matches!(expr.as_ref(), Expr::Lit(Lit::Str(_)))
    )
}

/// 从 Str 节点提取字符串值
fn str_value(s: &Str) -> String {
    s.value.as_str().unwrap_or_default().to_string()
}

fn create_str(value: &str, span: Span) -> Str {
    Str {
        span,
        value: value.into(),
        raw: None,
    }
}

/// 创建 side-effect import 声明 AST 节点
/// `import './a.css'`
fn create_side_effect_import(import_path: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![],
        src: Box::new(create_str(import_path, DUMMY_SP)),
        type_only: false,
        with: None,
        phase: Default::default(),
    }))
}

/// 脚本中没有 import，用 `require('./a.css')` 代替
fn create_side_effect_require(import_path: &str) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: Default::default(),
            callee: Callee::Expr(Box::new(Expr::Ident(Ident {
                span: DUMMY_SP,
                ctxt: Default::default(),
                sym: "require".into(),
                optional: false,
            }))),
            args: vec![ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Lit(Lit::Str(create_str(import_path, DUMMY_SP)))),
            }],
            type_args: None,
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::sync::Lrc;
    use swc_core::common::{FileName, SourceMap};
    use swc_core::ecma::parser::{parse_file_as_expr, Syntax};

    fn parse_expr(src: &str) -> Box<Expr> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Anon.into(), src.to_string());
        parse_file_as_expr(
            &fm,
            Syntax::default(),
            EsVersion::latest(),
            None,
            &mut vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_require_specifier_string() {
        let expr = parse_expr("require('./a.sss')");
        assert_eq!(require_specifier(&expr), Some("./a.sss".to_string()));
    }

    #[test]
    fn test_require_specifier_template() {
        let expr = parse_expr("require(`./a.sss`)");
        assert_eq!(require_specifier(&expr), Some("./a.sss".to_string()));
    }

    #[test]
    fn test_require_specifier_ignores_other_calls() {
        assert_eq!(require_specifier(&parse_expr("load('./a.sss')")), None);
        assert_eq!(require_specifier(&parse_expr("require(path)")), None);
        assert_eq!(require_specifier(&parse_expr("require(...paths)")), None);
        assert_eq!(require_specifier(&parse_expr("module.require('./a.sss')")), None);
    }

    #[test]
    fn test_selector_span_points_into_css() {
        let cm: Lrc<SourceMap> = Default::default();
        let css = ".a_header1_x1y2 {\n  color: red;\n}\n";
        let fm = cm.new_source_file(FileName::Anon.into(), css.to_string());

        let span = selector_span(&fm, css, "a_header1_x1y2");
        assert_eq!(span.lo, fm.start_pos);
        assert_eq!((span.hi - span.lo).0 as usize, ".a_header1_x1y2".len());

        assert_eq!(selector_span(&fm, css, "missing"), DUMMY_SP);
    }
}
