//! Library crate for shuttle-court-back, exposing the match engine and its HTTP service to binaries.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
