use thiserror::Error;

/// A single assembly error, tied to a source line by [`Diagnostic`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("label {0} is a reserved word")]
    ReservedLabel(String),

    #[error("label {0} is already defined")]
    DuplicateLabel(String),

    #[error("invalid destination register {0}")]
    UnknownDestReg(String),

    #[error("invalid source register {0}")]
    UnknownSrcReg(String),

    #[error("immediate out of range ({min} to {max})")]
    ImmOutOfRange { min: i64, max: i64 },

    #[error("immediate out of range (0x0 to {max:#x})")]
    HexOutOfRange { max: u64 },

    #[error("shift amount out of range (0 to 31)")]
    ShamtOutOfRange,

    #[error("label {0} is undefined")]
    UndefinedLabel(String),

    #[error("reserved word {0} used as a jump target")]
    ReservedTarget(String),

    #[error("jump target {0} cannot be resolved")]
    UnresolvedTarget(String),

    #[error("jump target {0} is out of range")]
    TargetOutOfRange(String),

    #[error("jump target {0} is not on an even address")]
    MisalignedTarget(String),

    #[error("data {value} exceeds the range of a {size}-byte item")]
    DataOutOfRange { value: String, size: u32 },

    #[error("label {label} cannot be used with the {directive} directive")]
    LabelNotAllowed {
        label: String,
        directive: &'static str,
    },

    #[error("statement cannot be encoded")]
    Unencodable,
}

/// An [`AsmError`] located at a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: AsmError,
}

impl Diagnostic {
    pub fn new(line: usize, error: AsmError) -> Self {
        Diagnostic { line, error }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, {}", self.line, self.error)
    }
}

/// Returned when either pass reported at least one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleFailure {
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Display for AssembleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assembly failed with {} error(s)", self.diagnostics.len())
    }
}

impl std::error::Error for AssembleFailure {}
