//! Application state shared across handlers

use common::mail::MailDispatcher;
use common::repositories::{ApplicationRepository, UserRepository};

use crate::middleware::TokenVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub application_repository: ApplicationRepository,
    pub user_repository: UserRepository,
    pub token_verifier: TokenVerifier,
    pub mail_dispatcher: MailDispatcher,
}
