pub mod alerts;
pub mod auth;
pub mod billing;
pub mod catalog;
pub mod chat;
pub mod coupons;
pub mod import;
pub mod jobs;
pub mod organizations;
pub mod patients;
pub mod routes;
pub mod sync;
pub mod users;
