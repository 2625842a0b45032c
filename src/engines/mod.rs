pub mod generation;
pub mod training;
