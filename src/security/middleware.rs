use crate::AppState;
use crate::api::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use super::claims::{UserClaims, UserContext};

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Get Authorization header
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        if state.config.security.jwt_required {
            return Err(ApiError::Unauthorized);
        }
        return Ok(next.run(request).await);
    };

    // 2. Decode & Validate Token
    let key = DecodingKey::from_secret(state.config.security.jwt_secret.as_bytes());
    let validation = Validation::default();

    match decode::<UserClaims>(token, &key, &validation) {
        Ok(token_data) => {
            let claims = token_data.claims;
            let context = UserContext {
                user_id: claims.sub.clone(),
                claims,
            };
            // 3. Inject Context
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Err(ApiError::Unauthorized)
        }
    }
}
