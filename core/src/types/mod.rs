pub mod context;
pub mod patch;
