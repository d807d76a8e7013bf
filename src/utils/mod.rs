pub mod csv;
pub mod validators;
