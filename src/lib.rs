pub mod audit;
pub mod config;
pub mod currency;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod nif;
pub mod pricing;
pub mod reference;
pub mod registry;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod status;
