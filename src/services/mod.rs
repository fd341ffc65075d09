pub mod data_service;
pub mod fallback;
pub mod growth;
