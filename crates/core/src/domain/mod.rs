pub mod order;
pub mod service;
pub mod summary;
