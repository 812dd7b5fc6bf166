pub mod classifier;
pub mod error;
pub mod flow;
pub mod kandi;
pub mod session;
