use thiserror::Error;

/// Errors that abort a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// No emission rule is registered for a block type.
    #[error("unknown block type '{block_type}' (block {block_id})")]
    UnknownBlockType { block_type: String, block_id: String },

    /// A rule needs an input that has no sensible default.
    #[error("block '{block_type}' is missing required input '{input}'")]
    MissingRequiredInput { block_type: String, input: String },

    /// A statement block was plugged into a value input.
    #[error("block '{block_type}' does not produce a value")]
    NotAnExpression { block_type: String },
}

pub type GenerateResult<T> = Result<T, GenerateError>;
