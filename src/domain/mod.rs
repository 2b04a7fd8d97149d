pub mod grid;
pub mod rules;
