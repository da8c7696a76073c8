//! Authentication router composition.

use crate::handlers::{auth, mypage};
use crate::providers::{EmailProvider, MemberRepository, PasswordHasher, TokenStore};
use crate::service::AuthService;
use axum::{
    Router,
    routing::{get, post},
};

/// Create the router for every credential lifecycle endpoint.
///
/// # Routes
///
/// ## Sessions
/// - `POST /auth/login` - Email and password for access and refresh tokens
/// - `POST /auth/refresh` - New access token
/// - `POST /auth/logout` - Revoke a refresh token
///
/// ## Registration
/// - `POST /auth/check-email` - Is the address free?
/// - `POST /auth/send-verification-email` - Mail a verification link
/// - `GET /auth/verify-email?token=` - Confirm the address
/// - `POST /auth/register` - Create member and pharmacy
///
/// ## Password reset
/// - `POST /auth/forgot-password` - Mail a reset link
/// - `POST /auth/reset-password` - Set a new password
///
/// ## Authenticated
/// - `POST /auth/check-password` - Re-enter password
/// - `POST /auth/delete-account` - Deactivate account
/// - `GET /mypage`, `PUT /mypage` - Pharmacy profile
///
/// # Example
///
/// ```rust,ignore
/// let service = AuthService::new(env, config);
///
/// let app = Router::new()
///     .merge(auth_router(service))
///     .layer(correlation_id_layers());
/// ```
pub fn auth_router<M, T, E, H>(service: AuthService<M, T, E, H>) -> Router
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    Router::new()
        // Sessions
        .route("/auth/login", post(auth::login::<M, T, E, H>))
        .route("/auth/refresh", post(auth::refresh::<M, T, E, H>))
        .route("/auth/logout", post(auth::logout::<M, T, E, H>))
        // Registration
        .route("/auth/check-email", post(auth::check_email::<M, T, E, H>))
        .route(
            "/auth/send-verification-email",
            post(auth::send_verification_email::<M, T, E, H>),
        )
        .route("/auth/verify-email", get(auth::verify_email::<M, T, E, H>))
        .route("/auth/register", post(auth::register::<M, T, E, H>))
        // Password reset
        .route(
            "/auth/forgot-password",
            post(auth::forgot_password::<M, T, E, H>),
        )
        .route(
            "/auth/reset-password",
            post(auth::reset_password::<M, T, E, H>),
        )
        // Authenticated
        .route(
            "/auth/check-password",
            post(auth::check_password::<M, T, E, H>),
        )
        .route(
            "/auth/delete-account",
            post(auth::delete_account::<M, T, E, H>),
        )
        .route(
            "/mypage",
            get(mypage::get_profile::<M, T, E, H>).put(mypage::update_profile::<M, T, E, H>),
        )
        .with_state(service)
}
