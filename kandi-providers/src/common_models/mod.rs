pub mod kandi;
pub mod macros;
pub mod user;
