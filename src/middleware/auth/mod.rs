pub mod access;

pub use access::bearer_token;
