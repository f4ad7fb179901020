//! HTTP handlers for `/api/auth`

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, RegisterResponse,
    ResendOtpRequest, Role, UserResponse, VerifyOtpRequest,
};
use crate::repository::{OtpRepository, UserRepository};
use crate::service::UserService;

pub const MSG_REGISTERED: &str =
    "User registered successfully. Please check your email for OTP verification.";
pub const MSG_LOGGED_IN: &str = "Login successful";
pub const MSG_VERIFIED: &str = "OTP verified successfully. Your account is now active!";
pub const MSG_OTP_RESENT: &str = "OTP resent successfully! Please check your email.";

#[derive(OpenApi)]
#[openapi(
    paths(register, login, verify_otp, resend_otp),
    components(
        schemas(
            RegisterRequest, LoginRequest, VerifyOtpRequest, ResendOtpRequest,
            RegisterResponse, AuthResponse, MessageResponse, UserResponse, Role
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and email verification")
    )
)]
pub struct ApiDoc;

type SharedService<R, O> = Arc<UserService<R, O>>;

/// Auth routes. All of them are public.
pub fn router<R, O>(service: UserService<R, O>) -> Router
where
    R: UserRepository + 'static,
    O: OtpRepository + 'static,
{
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .with_state(Arc::new(service))
}

/// Register a new account and email a verification code
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository, O: OtpRepository>(
    State(service): State<SharedService<R, O>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let user = service.register(input).await?;
    let body = RegisterResponse {
        success: true,
        message: MSG_REGISTERED.to_string(),
        user,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// Exchange email and password for a token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository, O: OtpRepository>(
    State(service): State<SharedService<R, O>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResponse>> {
    let (user, token) = service.login(input).await?;
    Ok(Json(AuthResponse {
        success: true,
        message: MSG_LOGGED_IN.to_string(),
        user,
        token,
    }))
}

/// Verify the emailed code and activate the account
#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_otp<R: UserRepository, O: OtpRepository>(
    State(service): State<SharedService<R, O>>,
    ValidatedJson(input): ValidatedJson<VerifyOtpRequest>,
) -> UserResult<Json<AuthResponse>> {
    let (user, token) = service.verify_otp(input).await?;
    Ok(Json(AuthResponse {
        success: true,
        message: MSG_VERIFIED.to_string(),
        user,
        token,
    }))
}

/// Send a fresh code to the account's address
#[utoipa::path(
    post,
    path = "/resend-otp",
    tag = "Auth",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Code resent", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn resend_otp<R: UserRepository, O: OtpRepository>(
    State(service): State<SharedService<R, O>>,
    ValidatedJson(input): ValidatedJson<ResendOtpRequest>,
) -> UserResult<Json<MessageResponse>> {
    service.resend_otp(input).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: MSG_OTP_RESENT.to_string(),
    }))
}
