pub mod fixtures;
pub mod sse;
