use std::path::Path;

use stylemap_core::{ClassNameMap, ScopedNaming, StageMessage};
use swc_core::common::util::take::Take;
use swc_core::css::ast::{
    ClassSelector, ComplexSelector, ComplexSelectorChildren, CompoundSelector,
    PseudoClassSelectorChildren, Stylesheet, SubclassSelector,
};
use swc_core::css::visit::{VisitMut, VisitMutWith};

use crate::error::ProcessError;
use crate::stage::{CssStage, StageInput};

/// 作用域类名阶段
///
/// 把样式表中每个类选择器 `.x` 改写为生成的作用域类名，
/// 并以 `ExportTokens` 消息导出 逻辑类名 -> 生成类名 的映射。
/// `:global(...)` 内的类名保持原样，`:local(...)` 照常改名，两者的外壳都会被去掉。
/// 处理器只从这个阶段的消息里取映射。
pub struct CssModules {
    naming: ScopedNaming,
}

impl CssModules {
    pub const NAME: &'static str = "css-modules";

    pub fn new(naming: ScopedNaming) -> Self {
        Self { naming }
    }
}

impl Default for CssModules {
    fn default() -> Self {
        Self::new(ScopedNaming::default())
    }
}

impl CssStage for CssModules {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &self,
        stylesheet: &mut Stylesheet,
        input: &StageInput<'_>,
        messages: &mut Vec<StageMessage>,
    ) -> Result<(), ProcessError> {
        let mut renamer = ClassRenamer {
            naming: &self.naming,
            path: input.path,
            tokens: ClassNameMap::new(),
        };
        stylesheet.visit_mut_with(&mut renamer);

        messages.push(StageMessage::export_tokens(Self::NAME, renamer.tokens));
        Ok(())
    }
}

/// 类选择器遍历器，使用 swc_css_visit 找到所有类选择器并改名
struct ClassRenamer<'a> {
    naming: &'a ScopedNaming,
    path: &'a Path,
    /// 按首次出现顺序记录映射
    tokens: ClassNameMap,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Local,
}

impl ClassRenamer<'_> {
    /// 展开复合选择器中的 `:global(...)` / `:local(...)`，结果追加到 `out`
    ///
    /// `.a:global(.b .c).d` 展开为 `.a_x.b .c.d_x`：外壳前后的部分
    /// 与括号内首尾的复合选择器合并。
    fn flatten_compound(&mut self, mut compound: CompoundSelector, out: &mut Vec<ComplexSelectorChildren>) {
        let mut found = None;
        for (index, selector) in compound.subclass_selectors.iter_mut().enumerate() {
            if let Some((scope, inner)) = take_scoped(selector) {
                found = Some((index, scope, inner));
                break;
            }
        }

        let Some((index, scope, mut inner)) = found else {
            compound.visit_mut_with(self);
            push_compound(out, compound);
            return;
        };

        // 已取空的伪类本身不再保留
        let rest: Vec<SubclassSelector> = compound.subclass_selectors.drain(index..).skip(1).collect();

        let span = compound.span;
        compound.visit_mut_with(self);
        if compound.nesting_selector.is_some()
            || compound.type_selector.is_some()
            || !compound.subclass_selectors.is_empty()
        {
            push_compound(out, compound);
        }

        if scope == Scope::Local {
            inner.visit_mut_with(self);
        }
        for child in inner.children {
            match child {
                ComplexSelectorChildren::CompoundSelector(c) => push_compound(out, c),
                combinator => out.push(combinator),
            }
        }

        if !rest.is_empty() {
            let suffix = CompoundSelector {
                span,
                nesting_selector: None,
                type_selector: None,
                subclass_selectors: rest,
            };
            self.flatten_compound(suffix, out);
        }
    }
}

impl VisitMut for ClassRenamer<'_> {
    fn visit_mut_complex_selector(&mut self, selector: &mut ComplexSelector) {
        let mut children = Vec::with_capacity(selector.children.len());
        for child in selector.children.drain(..) {
            match child {
                ComplexSelectorChildren::CompoundSelector(compound) => {
                    self.flatten_compound(compound, &mut children)
                }
                combinator => children.push(combinator),
            }
        }
        selector.children = children;
    }

    fn visit_mut_class_selector(&mut self, selector: &mut ClassSelector) {
        let (naming, path) = (self.naming, self.path);
        let local = selector.text.value.to_string();
        let generated = self
            .tokens
            .entry(local)
            .or_insert_with_key(|local| naming.generate_name(path, local))
            .clone();

        selector.text.value = generated.as_str().into();
        selector.text.raw = None;
    }
}

/// 取出 `:global(...)` / `:local(...)` 括号内的选择器
fn take_scoped(selector: &mut SubclassSelector) -> Option<(Scope, ComplexSelector)> {
    let SubclassSelector::PseudoClass(pseudo) = selector else {
        return None;
    };

    let name: &str = &pseudo.name.value;
    let scope = if name.eq_ignore_ascii_case("global") {
        Scope::Global
    } else if name.eq_ignore_ascii_case("local") {
        Scope::Local
    } else {
        return None;
    };

    match pseudo.children.as_deref_mut() {
        Some([PseudoClassSelectorChildren::ComplexSelector(inner)]) => Some((scope, inner.take())),
        _ => None,
    }
}

/// 相邻的复合选择器之间没有组合符，说明属于同一个复合选择器，需要合并
fn push_compound(out: &mut Vec<ComplexSelectorChildren>, next: CompoundSelector) {
    match out.last_mut() {
        Some(ComplexSelectorChildren::CompoundSelector(last)) => {
            if last.nesting_selector.is_none() {
                last.nesting_selector = next.nesting_selector;
            }
            if last.type_selector.is_none() {
                last.type_selector = next.type_selector;
            }
            last.subclass_selectors.extend(next.subclass_selectors);
        }
        _ => out.push(ComplexSelectorChildren::CompoundSelector(next)),
    }
}
