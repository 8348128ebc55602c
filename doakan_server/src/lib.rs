//! # Doakan server
//! This crate hosts the HTTP server for the Doakan donation platform's payment pipeline. It is responsible for:
//! * Authenticating API callers with bearer tokens and resolving them to users.
//! * Creating donation transactions, which opens a virtual-account charge at Midtrans.
//! * Receiving Midtrans payment notifications and reconciling transaction status.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/v1/transactions`: Create a transaction (auth required).
//! * `GET /api/v1/transactions`: The caller's transactions (auth required).
//! * `GET /api/v1/donasi/{id}/transactions`: A campaign's transactions, for its owner or an admin (auth required).
//! * `POST /api/v1/transactions/notification`: Midtrans payment notifications. Authenticated by signature.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
