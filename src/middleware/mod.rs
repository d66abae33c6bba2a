/*
 * Responsibility
 * - public entry points of the middleware layer
 * - auth::access for protected routes, cors/http for the whole router
 */
pub mod auth;
pub mod cors;
pub mod http;
