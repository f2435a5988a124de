pub mod convert;
pub mod database;
pub mod generator;
pub mod repositories;
