/*!
 * Identity resolver
 *
 * Responsibility:
 * - talk to the authentication authority (validate / login / logout / register)
 * - fetch user profiles from the user service
 * - report failures as a small closed set of `FailureCode`s
 *
 * The wire contract lives in `proto`, the tonic client in `grpc`.
 */

pub mod client;
pub mod grpc;
mod proto;

pub use client::{Credentials, FailureCode, IdentityResolver, NewUser, ResolverError, UserProfile};
pub use grpc::{GrpcResolver, RpcTimeouts};

#[cfg(test)]
pub use client::{MockIdentityResolver, ResolverResult};
