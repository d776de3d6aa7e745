pub mod amortization;
pub mod apperror;
pub mod config;
pub mod dni;
pub mod models;
