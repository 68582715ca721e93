// Library for tests to access modules

pub mod assembler;
pub mod chart;
pub mod cloud_repo;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod inventory;
pub mod models;
pub mod routes;
pub mod service;
pub mod version;
pub mod window;
