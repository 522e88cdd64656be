pub mod evaluator;
pub mod file;
pub mod map;
pub mod source;
