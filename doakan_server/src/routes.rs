//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
use actix_cors::Cors;
use actix_web::{
    get,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        StatusCode,
    },
    web,
    HttpResponse,
    Responder,
};
use doakan_engine::{
    traits::{PaymentGateway, TransactionManagement, UserManagement},
    ReconcileOutcome,
    TransactionFlowApi,
    TransactionFlowError,
};
use log::*;
use midtrans_tools::MidtransNotification;

use crate::{
    data_objects::{ApiResponse, NewTransactionRequest, NotificationAck, TransactionResponse},
    errors::ServerError,
    integrations::midtrans::{normalize_notification, MidtransNotificationVerifier},
    middleware::CurrentUser,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    // Authenticated routes take an extra type parameter, `U`, for the user store that the bearer token middleware
    // resolves callers against.
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where authenticated) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ U >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ core::marker::PhantomData<fn() -> U> );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ U > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ U > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+ core::marker::PhantomData::<fn() -> U>)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+ U> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+ U>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
            U: doakan_engine::traits::UserManagement + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::BearerAuthMiddlewareFactory::<U>::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Registers every route. `B` is the transaction store, `G` the payment gateway and `U` the user store.
pub fn configure_routes<B, G, U>(cfg: &mut web::ServiceConfig)
where
    B: TransactionManagement + 'static,
    G: PaymentGateway + 'static,
    U: UserManagement + 'static,
{
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let path_config =
        web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into());
    cfg.app_data(json_config).app_data(path_config).service(health).service(
        web::scope("/api/v1")
            .wrap(cors())
            .service(TransactionNotificationRoute::<B, G>::new())
            .service(CreateTransactionRoute::<B, G, U>::new())
            .service(MyTransactionsRoute::<B, G, U>::new())
            .service(DonationTransactionsRoute::<B, G, U>::new()),
    );
}

/// The API is called from browsers on other origins. Bearer tokens travel in a header rather than a cookie, so any
/// origin may call it and no credentials are allowed. Preflight requests are answered here and never reach the
/// authentication middleware.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(["GET", "POST", "OPTIONS"])
        .allowed_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .max_age(3600)
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(create_transaction => Post "/transactions" impl TransactionManagement, PaymentGateway where authenticated);
/// Route handler for creating a donation transaction.
///
/// The body is `{"donation_id": 1, "amount": 50000}` (`donationID` is accepted too). On success the new `pending`
/// transaction is returned with a 201, including the virtual account the donor should pay into.
pub async fn create_transaction<B, G>(
    user: CurrentUser,
    body: web::Json<NewTransactionRequest>,
    api: web::Data<TransactionFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionManagement,
    G: PaymentGateway,
{
    let NewTransactionRequest { donation_id, amount } = body.into_inner();
    let user_id = user.user().id;
    debug!("💻️ POST transaction of {amount} to donation #{donation_id} from user #{user_id}");
    let tx = api.create_transaction(donation_id, user_id, amount).await?;
    let response = ApiResponse::success(StatusCode::CREATED, "Transaction created", TransactionResponse::from(tx));
    Ok(HttpResponse::Created().json(response))
}

route!(my_transactions => Get "/transactions" impl TransactionManagement, PaymentGateway where authenticated);
pub async fn my_transactions<B, G>(
    user: CurrentUser,
    api: web::Data<TransactionFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionManagement,
    G: PaymentGateway,
{
    let user_id = user.user().id;
    debug!("💻️ GET transactions for user #{user_id}");
    let txs = api.transactions_for_user(user_id).await?;
    let txs = txs.into_iter().map(TransactionResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(ApiResponse::success(StatusCode::OK, "List of transactions", txs)))
}

route!(donation_transactions => Get "/donasi/{id}/transactions" impl TransactionManagement, PaymentGateway where authenticated);
/// Route handler for a campaign's transactions. Only the campaign owner and admins may call it.
pub async fn donation_transactions<B, G>(
    user: CurrentUser,
    path: web::Path<i64>,
    api: web::Data<TransactionFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionManagement,
    G: PaymentGateway,
{
    let donation_id = path.into_inner();
    debug!("💻️ GET transactions for donation #{donation_id} by user #{}", user.user().id);
    let txs = api.transactions_for_donation(donation_id, user.user()).await?;
    let txs = txs.into_iter().map(TransactionResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(ApiResponse::success(StatusCode::OK, "List of donation transactions", txs)))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(transaction_notification => Post "/transactions/notification" impl TransactionManagement, PaymentGateway);
/// Route handler for Midtrans payment notifications.
///
/// The call is authenticated by the notification's `signature_key`, not by a bearer token. Anything that was received
/// and understood is acknowledged with a 200, whatever it did to the transaction, so that Midtrans stops retrying.
/// Storage failures are the exception: they return a 500, and Midtrans will redeliver the notification later.
pub async fn transaction_notification<B, G>(
    body: web::Bytes,
    verifier: web::Data<MidtransNotificationVerifier>,
    api: web::Data<TransactionFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionManagement,
    G: PaymentGateway,
{
    trace!("💻️ Received payment notification");
    let notification = serde_json::from_slice::<MidtransNotification>(&body).map_err(|e| {
        warn!("💻️ Could not deserialize payment notification. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    verifier.verify(&notification)?;
    let notification = normalize_notification(&notification)?;
    let order_id = notification.order_ref.clone();
    let (message, status) = match api.reconcile(notification).await {
        Ok(ReconcileOutcome::Transitioned(tx)) => ("Notification processed", Some(tx.status)),
        Ok(ReconcileOutcome::Replayed(tx)) => ("Notification already processed", Some(tx.status)),
        Ok(ReconcileOutcome::StillPending(tx)) => ("Notification received", Some(tx.status)),
        Err(TransactionFlowError::UnknownGatewayStatus(s)) => {
            info!("💻️ Acknowledging notification for [{order_id}] with unknown status '{s}'. It needs manual review.");
            ("Notification received", None)
        },
        Err(e) => return Err(e.into()),
    };
    let ack = NotificationAck { order_id, status };
    Ok(HttpResponse::Ok().json(ApiResponse::success(StatusCode::OK, message, ack)))
}
