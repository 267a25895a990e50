pub mod access;
pub mod auth;
pub mod company_service;
pub mod dashboard_service;
pub mod duitnow;
pub mod payment_service;
pub mod subscription;
pub mod user_service;
