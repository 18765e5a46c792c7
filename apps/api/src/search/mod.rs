pub mod fallback;
pub mod handlers;
pub mod interpreter;
pub mod parsed_query;
pub mod service;
pub mod structured;
