//! The member authentication boundary.
//!
//! Members authenticate with an opaque access token in the `dnt-access-token` header. The
//! [`MemberToken`] extractor pulls the header off the request; [`MemberAuthApi`] resolves it
//! against the members table. Handlers never see the raw header.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use dnt_payment_engine::{db_types::Member, traits::PaymentGatewayDatabase};
use log::*;

use crate::errors::{AuthError, ServerError};

pub const ACCESS_TOKEN_HEADER: &str = "dnt-access-token";

/// The raw access token presented by the client. Possession of the header is not authentication;
/// the token still has to resolve to a member.
#[derive(Debug, Clone)]
pub struct MemberToken(String);

impl MemberToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for MemberToken {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| MemberToken(s.to_string()))
            .ok_or(ServerError::AuthenticationError(AuthError::MissingToken));
        ready(token)
    }
}

/// Resolves access tokens to members.
#[derive(Debug, Clone)]
pub struct MemberAuthApi<B> {
    db: B,
}

impl<B> MemberAuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> MemberAuthApi<B>
where B: PaymentGatewayDatabase
{
    pub async fn resolve(&self, token: &MemberToken) -> Result<Member, ServerError> {
        match self.db.fetch_member_by_access_token(token.as_str()).await? {
            Some(member) => Ok(member),
            None => {
                debug!("💻️ An access token did not resolve to any member");
                Err(ServerError::AuthenticationError(AuthError::InvalidToken))
            },
        }
    }
}
