use actix_web::HttpRequest;
use jsonwebtoken::{decode, DecodingKey};
use serde_derive::{Deserialize, Serialize};

use crate::{service::Caller, utils::get_token, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Resolves the caller from the bearer token. Tokens that fail to decode
/// make the caller anonymous rather than failing the request, so the note
/// service reports `Unauthenticated` uniformly.
pub fn caller(req: &HttpRequest, env: &AppState) -> Caller {
    let token = match get_token(req) {
        Some(token) => token,
        None => return Caller::anonymous(),
    };

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(env.secret.as_ref()),
        &env.jwt_validator,
    ) {
        Ok(data) => Caller::user(data.claims.sub),
        Err(e) => {
            log::debug!("rejected token: {e}");
            Caller::anonymous()
        }
    }
}
