pub mod charts;
pub mod form;
pub mod mentions;
pub mod summary;
