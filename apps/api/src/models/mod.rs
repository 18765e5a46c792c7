pub mod application;
pub mod employee;
pub mod requirement;
pub mod skill;
