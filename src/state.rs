use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn},
    gateway::{PaymentGateway, credentials::CredentialCache},
    registry::NifRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub gateway: Arc<dyn PaymentGateway>,
    pub registry: Arc<dyn NifRegistry>,
    pub credentials: Arc<CredentialCache>,
    pub callback_url: String,
}
