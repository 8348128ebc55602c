use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use doakan_engine::{AuthApi, SqliteDatabase, TransactionFlowApi};
use log::*;
use midtrans_tools::MidtransApi;

use crate::{
    auth::TokenValidator,
    config::ServerConfig,
    errors::ServerError,
    integrations::midtrans::{MidtransGateway, MidtransNotificationVerifier},
    routes::configure_routes,
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    info!("🗃️ Database migrations are up to date");
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let api = MidtransApi::new(config.midtrans.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = MidtransGateway::new(api);
    let verifier = MidtransNotificationVerifier::new(config.midtrans.server_key.clone(), config.signature_checks);
    let srv = HttpServer::new(move || {
        let transactions_api =
            TransactionFlowApi::new(db.clone(), gateway.clone()).with_status_mapping(config.status_mapping.clone());
        let auth_api = AuthApi::new(db.clone());
        let token_validator = TokenValidator::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("doakan::access_log"))
            .app_data(web::Data::new(transactions_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(token_validator))
            .app_data(web::Data::new(verifier.clone()))
            .configure(configure_routes::<SqliteDatabase, MidtransGateway, SqliteDatabase>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
