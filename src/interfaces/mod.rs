//! Outer surfaces over the engine: the CSV script format read by the
//! replay binary and the balance report it writes.

pub mod csv;
pub mod replay;
