pub mod reader;
pub mod writer;

mod v3000;

pub use reader::{read, read_all, skip, SkipOutcome};
pub use writer::write;

/// Connection-table sub-format selection, normally driven by a
/// command-style option (`2`/`3`) in the conversion front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MolVersion {
    /// V2000 unless the record exceeds 999 atoms or bonds.
    #[default]
    Auto,
    V2000,
    V3000,
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub version: MolVersion,
    /// Suppresses the `$$$$` terminator after the final record of a stream.
    pub last_record: bool,
}
