pub mod auth;
pub mod billing_service;
pub mod chat_service;
pub mod import_service;
pub mod job_service;
pub mod payment;
pub mod route_service;
pub mod subscription_service;
