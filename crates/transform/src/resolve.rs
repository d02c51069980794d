use std::path::{Component, Path, PathBuf};

/// 参与转换的样式表后缀
pub const STYLESHEET_SUFFIX: &str = ".sss";

/// 判断 import / require 的路径是否指向需要转换的样式表
pub fn is_stylesheet(specifier: &str) -> bool {
    specifier.ends_with(STYLESHEET_SUFFIX)
}

/// 处理后的 CSS 文件路径：把样式表后缀换成 `.css`
///
/// `./a.sss` → `./a.css`
pub fn sibling_css_specifier(specifier: &str) -> String {
    match specifier.strip_suffix(STYLESHEET_SUFFIX) {
        Some(stem) => format!("{}.css", stem),
        None => specifier.to_string(),
    }
}

/// 解析样式表路径
///
/// 以 `.` 开头的路径相对于源文件所在目录解析；
/// 其它路径视为外部模块引用，原样返回（不会去 node_modules 之类的地方查找）。
pub fn resolve_stylesheet_path(specifier: &str, source_file: &Path) -> PathBuf {
    if !specifier.starts_with('.') {
        return PathBuf::from(specifier);
    }

    let base = source_file.parent().unwrap_or_else(|| Path::new(""));
    normalize(&base.join(specifier))
}

/// 按词法去掉 `.` 和 `..`，不访问文件系统
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // 根目录之上没有父目录
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
