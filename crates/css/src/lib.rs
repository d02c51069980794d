//! 样式表处理器
//!
//! 读取样式表文件，依次执行配置的处理阶段，把结果写回原文件，
//! 并返回作用域命名阶段产出的类名映射（如果有的话）。

pub mod css_modules;
pub mod discard_empty;
pub mod emit;
pub mod error;
pub mod parse;
pub mod processor;
pub mod stage;

// Re-export main types
pub use css_modules::CssModules;
pub use discard_empty::DiscardEmpty;
pub use emit::emit_css;
pub use error::ProcessError;
pub use parse::parse_stylesheet;
pub use processor::{ProcessOutput, StylesheetProcessor};
pub use stage::{build_stage, CssStage, StageInput};

// Re-export SWC CSS types
pub use swc_core::css::ast::Stylesheet;
pub use stylemap_core::{ClassNameMap, ProcessorConfig, StageConfig, StageMessage};
