/*
 * Responsibility
 * - public face of the HTTP API (routes() and the types handlers share)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
