pub mod pages;
pub mod predict;
pub mod predictions;
