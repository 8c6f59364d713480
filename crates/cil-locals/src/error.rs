use crate::cil::{Direction, Opcode};

/// Message carried by [`Error::InvalidLocalOperand`].
pub const INVALID_LOCAL_OPERAND: &str =
    "operand is not a valid local-variable reference, or is absent";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("instruction is absent")]
    MissingInstruction,

    #[error("instruction opcode is not a local load or store type: {0}")]
    NotLocalAccess(Opcode),

    #[error("must be a {expected} instruction, found {opcode}")]
    DirectionMismatch { expected: Direction, opcode: Opcode },

    #[error("{}", INVALID_LOCAL_OPERAND)]
    InvalidLocalOperand { opcode: Opcode },

    #[error("unexpected opcode: {0}")]
    UnexpectedOpcode(Opcode),

    #[error("method declares more than {} locals", crate::cil::MAX_LOCALS)]
    TooManyLocals,

    #[error("operand does not fit {0}")]
    MalformedOperand(Opcode),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Coarse classification of [`Error`] for callers deciding whether to skip a
/// candidate or abort a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller picked the wrong instruction.
    InvalidArgument,
    /// The instruction stream itself is malformed.
    InternalState,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInstruction
            | Self::NotLocalAccess(_)
            | Self::DirectionMismatch { .. }
            | Self::TooManyLocals
            | Self::Parse { .. } => ErrorKind::InvalidArgument,
            Self::InvalidLocalOperand { .. }
            | Self::UnexpectedOpcode(_)
            | Self::MalformedOperand(_) => ErrorKind::InternalState,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
