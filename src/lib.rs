pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod export;
pub mod lookups;
pub mod source;
pub mod types;
pub mod validator;
