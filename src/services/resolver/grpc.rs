//! tonic-backed [`IdentityResolver`].
//!
//! Both channels are created lazily and shared: tonic multiplexes calls over
//! one HTTP/2 connection per backend and reconnects on its own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use uuid::Uuid;

use super::client::{
    Credentials, FailureCode, IdentityResolver, NewUser, ResolverError, ResolverResult,
    UserProfile,
};
use super::proto::{auth, user};

pub const AUTH_BACKEND: &str = "auth-service";
pub const USER_BACKEND: &str = "user-service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcTimeouts {
    /// validate / login / logout / register
    pub auth: Duration,
    /// profile fetches
    pub profile: Duration,
}

#[derive(Clone)]
pub struct GrpcResolver {
    auth: Channel,
    users: Channel,
    timeouts: RpcTimeouts,
}

#[derive(Clone, Copy)]
struct Call {
    backend: &'static str,
    operation: &'static str,
    path: &'static str,
    timeout: Duration,
}

impl GrpcResolver {
    /// No connection is attempted here; the first call dials the backend.
    pub fn connect_lazy(
        auth_addr: &str,
        user_addr: &str,
        timeouts: RpcTimeouts,
    ) -> ResolverResult<Self> {
        Ok(Self {
            auth: lazy_channel(auth_addr, timeouts.auth)?,
            users: lazy_channel(user_addr, timeouts.profile)?,
            timeouts,
        })
    }

    fn auth_call(&self, operation: &'static str, path: &'static str) -> Call {
        Call {
            backend: AUTH_BACKEND,
            operation,
            path,
            timeout: self.timeouts.auth,
        }
    }
}

fn lazy_channel(addr: &str, connect_timeout: Duration) -> ResolverResult<Channel> {
    let endpoint = Endpoint::from_shared(addr.to_string())
        .map_err(|e| ResolverError::InvalidEndpoint {
            addr: addr.to_string(),
            message: e.to_string(),
        })?
        .connect_timeout(connect_timeout);

    Ok(endpoint.connect_lazy())
}

async fn unary<Req, Resp>(channel: &Channel, call: Call, request: Req) -> ResolverResult<Resp>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let started = Instant::now();

    let exchange = async {
        let mut grpc = tonic::client::Grpc::new(channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;

        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        grpc.unary(
            tonic::Request::new(request),
            PathAndQuery::from_static(call.path),
            codec,
        )
        .await
    };

    match tokio::time::timeout(call.timeout, exchange).await {
        Ok(Ok(response)) => Ok(response.into_inner()),
        Ok(Err(status)) => Err(from_status(call, status, started.elapsed())),
        Err(_) => Err(ResolverError::Timeout {
            backend: call.backend,
            operation: call.operation,
            elapsed: started.elapsed(),
        }),
    }
}

/// gRPC status code -> resolver failure code. Everything unlisted is internal.
pub fn failure_code(code: Code) -> FailureCode {
    match code {
        Code::InvalidArgument => FailureCode::InvalidArgument,
        Code::Unauthenticated => FailureCode::Unauthenticated,
        Code::NotFound => FailureCode::NotFound,
        Code::AlreadyExists => FailureCode::AlreadyExists,
        _ => FailureCode::Internal,
    }
}

fn from_status(call: Call, status: Status, elapsed: Duration) -> ResolverError {
    match status.code() {
        Code::DeadlineExceeded => ResolverError::Timeout {
            backend: call.backend,
            operation: call.operation,
            elapsed,
        },
        // What tonic reports for transport failures, not an answer from the backend.
        Code::Unavailable | Code::Unknown | Code::Cancelled => ResolverError::Unavailable {
            backend: call.backend,
            operation: call.operation,
            message: status.message().to_string(),
        },
        code => ResolverError::rejected(
            call.backend,
            call.operation,
            failure_code(code),
            status.message(),
        ),
    }
}

fn parse_id(call: Call, raw: &str) -> ResolverResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| ResolverError::InvalidReply {
        backend: call.backend,
        operation: call.operation,
        message: format!("user_id: {e}"),
    })
}

#[async_trait]
impl IdentityResolver for GrpcResolver {
    async fn validate(&self, credential: &str) -> ResolverResult<Uuid> {
        let call = self.auth_call("validate_token", auth::VALIDATE_TOKEN);
        let reply: auth::ValidateTokenResponse = unary(
            &self.auth,
            call,
            auth::TokenRequest {
                jwt_token: credential.to_string(),
            },
        )
        .await?;

        // proto3 leaves absent strings empty: the token belongs to nobody.
        if reply.user_id.is_empty() {
            return Ok(Uuid::nil());
        }

        parse_id(call, &reply.user_id)
    }

    async fn create_user(&self, new_user: &NewUser) -> ResolverResult<Uuid> {
        let call = self.auth_call("create_user", auth::CREATE_USER);
        let reply: auth::CreateUserResponse = unary(
            &self.auth,
            call,
            auth::CreateUserRequest {
                email: new_user.email.clone(),
                username: new_user.username.clone(),
                password: new_user.password.clone(),
            },
        )
        .await?;

        parse_id(call, &reply.user_id)
    }

    async fn login(&self, credentials: &Credentials) -> ResolverResult<String> {
        let call = self.auth_call("login", auth::LOGIN);
        let reply: auth::LoginResponse = unary(
            &self.auth,
            call,
            auth::LoginRequest {
                email: credentials.email.clone(),
                password: credentials.password.clone(),
            },
        )
        .await?;

        if reply.jwt_token.is_empty() {
            return Err(ResolverError::InvalidReply {
                backend: call.backend,
                operation: call.operation,
                message: "empty token".to_string(),
            });
        }

        Ok(reply.jwt_token)
    }

    async fn logout(&self, credential: &str) -> ResolverResult<()> {
        let call = self.auth_call("logout", auth::LOGOUT);
        let _: auth::LogoutResponse = unary(
            &self.auth,
            call,
            auth::TokenRequest {
                jwt_token: credential.to_string(),
            },
        )
        .await?;

        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> ResolverResult<UserProfile> {
        let call = Call {
            backend: USER_BACKEND,
            operation: "get_user",
            path: user::GET_USER,
            timeout: self.timeouts.profile,
        };
        let reply: user::GetUserResponse = unary(
            &self.users,
            call,
            user::GetUserRequest {
                user_id: user_id.to_string(),
            },
        )
        .await?;

        Ok(UserProfile {
            id: parse_id(call, &reply.user_id)?,
            email: reply.email,
            username: reply.username,
            firstname: reply.firstname,
            lastname: reply.lastname,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::net::TcpListener;

    use super::*;

    const FAST: RpcTimeouts = RpcTimeouts {
        auth: Duration::from_millis(150),
        profile: Duration::from_millis(150),
    };

    #[rstest]
    #[case(Code::InvalidArgument, FailureCode::InvalidArgument)]
    #[case(Code::Unauthenticated, FailureCode::Unauthenticated)]
    #[case(Code::NotFound, FailureCode::NotFound)]
    #[case(Code::AlreadyExists, FailureCode::AlreadyExists)]
    #[case(Code::Internal, FailureCode::Internal)]
    #[case(Code::PermissionDenied, FailureCode::Internal)]
    #[case(Code::ResourceExhausted, FailureCode::Internal)]
    fn grpc_codes_map_to_failure_codes(#[case] code: Code, #[case] expected: FailureCode) {
        assert_eq!(failure_code(code), expected);
    }

    #[test]
    fn transport_statuses_carry_no_structured_code() {
        let call = Call {
            backend: AUTH_BACKEND,
            operation: "validate_token",
            path: auth::VALIDATE_TOKEN,
            timeout: FAST.auth,
        };

        let unavailable = from_status(call, Status::unavailable("tcp reset"), Duration::ZERO);
        assert!(matches!(unavailable, ResolverError::Unavailable { .. }));
        assert_eq!(unavailable.failure_code(), FailureCode::Internal);

        let deadline = from_status(call, Status::deadline_exceeded("slow"), Duration::ZERO);
        assert!(matches!(deadline, ResolverError::Timeout { .. }));

        let refused = from_status(call, Status::unauthenticated("expired"), Duration::ZERO);
        assert_eq!(refused.failure_code(), FailureCode::Unauthenticated);
    }

    #[tokio::test]
    async fn malformed_address_is_rejected_up_front() {
        let result = GrpcResolver::connect_lazy("http://bad host", "http://users:1", FAST);
        assert!(matches!(
            result,
            Err(ResolverError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn silent_backend_fails_within_timeout() {
        // Accepts TCP connections and never speaks HTTP/2.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let resolver = GrpcResolver::connect_lazy(&addr, &addr, FAST).unwrap();

        let started = Instant::now();
        let err = resolver.validate("abc").await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(2), "{err}");
        assert_eq!(err.failure_code(), FailureCode::Internal);
    }

    #[tokio::test]
    async fn unreachable_backend_is_internal_not_unauthenticated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let resolver = GrpcResolver::connect_lazy(&addr, &addr, FAST).unwrap();
        let err = resolver.validate("abc").await.unwrap_err();

        assert_eq!(err.failure_code(), FailureCode::Internal, "{err}");
    }
}
