use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("byte {value:#04x} at offset {offset} is outside the symbol domain")]
    OutOfDomainSymbol { value: u8, offset: usize },

    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    #[error("corrupt tree: {0}")]
    CorruptTree(String),

    #[error("payload underflow: expected at least {expected} bytes, found {actual}")]
    UnderflowPayload { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
