use std::path::Path;

use crate::config::DEFAULT_SCOPED_PATTERN;

/// 作用域类名生成器
///
/// 根据模板生成类名，支持的占位符：
/// - `[name]`: 样式表文件名（不含扩展名）
/// - `[local]`: 样式表中书写的原始类名
/// - `[hash]`: 基于文件路径和原始类名的短 hash
///
/// 例如默认模板 `[name]_[local]_[hash]` 对 `a.sss` 中的 `.header1`
/// 生成类似 `a_header1_3f9c2` 的名字。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedNaming {
    pattern: String,
}

impl Default for ScopedNaming {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPED_PATTERN)
    }
}

impl ScopedNaming {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 为 `path` 中的逻辑类名 `local` 生成作用域类名
    ///
    /// 相同的 (path, local) 总是得到相同的结果。
    pub fn generate_name(&self, path: &Path, local: &str) -> String {
        self.pattern
            .replace("[name]", &file_stem(path))
            .replace("[local]", local)
            .replace("[hash]", &short_hash(path, local))
    }
}

/// 取文件名主体，非标识符字符替换为下划线
fn file_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn short_hash(path: &Path, local: &str) -> String {
    let input = format!("{}:{}", path.display(), local);
    let hash = blake3::hash(input.as_bytes());

    // 取前 5 个十六进制字符，足以在单个文件内区分类名
    let hex = format!("{}", hash);
    hex[..5].to_string()
}
