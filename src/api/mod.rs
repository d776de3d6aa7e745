pub mod endpoints;
pub mod middleware;
pub mod openapi;
pub mod rest;
pub mod state;
