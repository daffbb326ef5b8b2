#![doc = "The `crewbase` library crate."]
#![doc = ""]
#![doc = "This crate contains the identity and team-membership core of the CrewBase"]
#![doc = "backend: credential storage, multi-kind token issuance and verification,"]
#![doc = "the team-invitation join protocol, password reset, session management,"]
#![doc = "and the membership guard consumed by resource-mutation paths. It is used"]
#![doc = "by the main binary (`main.rs`) to construct and run the application."]

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod storage;
pub mod teams;
