// Library root for the DevHub API

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod engine;
pub mod infra;
pub mod proxy;
pub mod state;
