use thiserror::Error;

/// Failures are per record and non-recoverable within the record: the first
/// error aborts the current parse or emit and no partial molecule is
/// promised. Numeric field content never errors on its own (it degrades to
/// zero); structural problems fail hard.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("malformed molfile header: {details} (at line ~{line})")]
    MalformedHeader { line: usize, details: String },

    #[error("malformed atom line: {details} (at line ~{line})")]
    MalformedAtomLine { line: usize, details: String },

    #[error("malformed bond line: {details} (at line ~{line})")]
    MalformedBondLine { line: usize, details: String },

    #[error("malformed V3000 line: {details} (at line ~{line})")]
    MalformedV3000Line { line: usize, details: String },

    #[error("unbalanced V3000 block: {details} (at line ~{line})")]
    UnbalancedBlock { line: usize, details: String },

    #[error("malformed V3000 key/value token '{token}' (at line ~{line})")]
    MalformedKeyValue { line: usize, token: String },

    #[error("record too large for V2000: {atoms} atoms, {bonds} bonds (limit 999 each)")]
    RecordTooLarge { atoms: usize, bonds: usize },

    #[error("stream ended before the record was complete (at line ~{line})")]
    PrematureEndOfStream { line: usize },
}

impl Error {
    pub(crate) fn header(line: usize, details: impl Into<String>) -> Self {
        Self::MalformedHeader {
            line,
            details: details.into(),
        }
    }

    pub(crate) fn atom(line: usize, details: impl Into<String>) -> Self {
        Self::MalformedAtomLine {
            line,
            details: details.into(),
        }
    }

    pub(crate) fn bond(line: usize, details: impl Into<String>) -> Self {
        Self::MalformedBondLine {
            line,
            details: details.into(),
        }
    }

    pub(crate) fn v3000(line: usize, details: impl Into<String>) -> Self {
        Self::MalformedV3000Line {
            line,
            details: details.into(),
        }
    }

    pub(crate) fn block(line: usize, details: impl Into<String>) -> Self {
        Self::UnbalancedBlock {
            line,
            details: details.into(),
        }
    }
}
