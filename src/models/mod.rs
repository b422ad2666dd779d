pub mod alerts;
pub mod auth;
pub mod billing;
pub mod catalog;
pub mod chat;
pub mod jobs;
pub mod organization;
pub mod patients;
pub mod routes;
