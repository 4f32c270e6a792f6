use netcomp_ir::ConversionError;
use thiserror::Error;

/// Input that cannot be parsed as configuration text at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    NotUtf8 { valid_up_to: usize },
    #[error("input looks binary (NUL byte at offset {offset})")]
    BinaryInput { offset: usize },
}

/// Failure of [`crate::compile`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] FatalError),
    #[error(transparent)]
    Convert(#[from] ConversionError),
}
