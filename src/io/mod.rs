pub mod error;
pub mod mdl;
pub mod util;
