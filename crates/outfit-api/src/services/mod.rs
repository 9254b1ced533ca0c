//! Application services

pub mod generation;
