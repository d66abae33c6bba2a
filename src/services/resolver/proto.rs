//! Wire messages for the auth and user services.
//!
//! Field tags must stay in sync with the backends' `.proto` definitions.

pub mod auth {
    pub const CREATE_USER: &str = "/auth_service.AuthService/CreateUser";
    pub const LOGIN: &str = "/auth_service.AuthService/Login";
    pub const VALIDATE_TOKEN: &str = "/auth_service.AuthService/ValidateToken";
    pub const LOGOUT: &str = "/auth_service.AuthService/Logout";

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateUserRequest {
        #[prost(string, tag = "1")]
        pub email: String,
        #[prost(string, tag = "2")]
        pub username: String,
        #[prost(string, tag = "3")]
        pub password: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateUserResponse {
        #[prost(string, tag = "1")]
        pub user_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LoginRequest {
        #[prost(string, tag = "1")]
        pub email: String,
        #[prost(string, tag = "2")]
        pub password: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LoginResponse {
        #[prost(string, tag = "1")]
        pub jwt_token: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TokenRequest {
        #[prost(string, tag = "1")]
        pub jwt_token: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ValidateTokenResponse {
        #[prost(string, tag = "1")]
        pub user_id: String,
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct LogoutResponse {}
}

pub mod user {
    pub const GET_USER: &str = "/user_service.UserService/GetUser";

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetUserRequest {
        #[prost(string, tag = "1")]
        pub user_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetUserResponse {
        #[prost(string, tag = "1")]
        pub user_id: String,
        #[prost(string, tag = "2")]
        pub email: String,
        #[prost(string, tag = "3")]
        pub username: String,
        #[prost(string, tag = "4")]
        pub firstname: String,
        #[prost(string, tag = "5")]
        pub lastname: String,
    }
}
