use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// 源文件本身无法解析
    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },

    #[error("failed to emit code: {0}")]
    Codegen(String),

    #[error("failed to write source map: {0}")]
    SourceMap(String),

    #[error("generated output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
