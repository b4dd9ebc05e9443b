pub mod clinic_api;

pub use clinic_api::{ApiError, ClinicApiClient};
