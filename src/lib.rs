#![doc = "The `ticketdesk` library crate."]
#![doc = ""]
#![doc = "Two subsystems share this crate. The web API (users, tasks, bearer-token auth)"]
#![doc = "is assembled by `main.rs`; the thermal-printer ticket tool is driven by the"]
#![doc = "`ticketdesk-cli` binary."]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod printer;
pub mod repository;
pub mod routes;
pub mod state;
pub mod ticket;

pub use crate::error::AppError;
pub use crate::state::AppState;
