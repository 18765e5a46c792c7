pub mod composite;
pub mod discovery;
pub mod handlers;
pub mod learning;
pub mod policy;
pub mod service;
pub mod skill_match;
