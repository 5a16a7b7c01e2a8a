pub mod restart;
pub mod translate;
