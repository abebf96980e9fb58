//! HTTP adapter: warp filters under `/api/accounts` delegating to the
//! [`AccountService`].

mod error;
mod handlers;
mod requests;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;
use warp::{Filter, Rejection, Reply};

use crate::application::AccountService;
use crate::domain::AccountId;

pub use error::{ApiError, ErrorDetails, handle_rejection};
pub use handlers::{ACCOUNT_DELETED, Service, TRANSFER_COMPLETED};
pub use requests::{AmountRequest, CreateAccountRequest, TransferRequest};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// The full API: routes, JSON error bodies and request tracing.
pub fn api(
    service: Service,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    routes(service)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// All account routes. Rejections are left for [`handle_rejection`].
pub fn routes(
    service: Service,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create_route = accounts()
        .and(warp::path::end())
        .and(warp::post())
        .and(with_service(Arc::clone(&service)))
        .and(json_body::<CreateAccountRequest>())
        .and_then(handlers::create_account);

    let list_route = accounts()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(Arc::clone(&service)))
        .and_then(handlers::list_accounts);

    let transfer_route = accounts()
        .and(warp::path("transfer"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_service(Arc::clone(&service)))
        .and(json_body::<TransferRequest>())
        .and_then(handlers::transfer);

    let get_route = accounts()
        .and(warp::path::param::<AccountId>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(Arc::clone(&service)))
        .and_then(handlers::get_account);

    let delete_route = accounts()
        .and(warp::path::param::<AccountId>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_service(Arc::clone(&service)))
        .and_then(handlers::delete_account);

    let deposit_route = accounts()
        .and(warp::path::param::<AccountId>())
        .and(warp::path("deposit"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_service(Arc::clone(&service)))
        .and(json_body::<AmountRequest>())
        .and_then(handlers::deposit);

    let withdraw_route = accounts()
        .and(warp::path::param::<AccountId>())
        .and(warp::path("withdraw"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_service(Arc::clone(&service)))
        .and(json_body::<AmountRequest>())
        .and_then(handlers::withdraw);

    let transactions_route = accounts()
        .and(warp::path::param::<AccountId>())
        .and(warp::path("transactions"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(Arc::clone(&service)))
        .and_then(handlers::list_transactions);

    create_route
        .or(list_route)
        .or(transfer_route)
        .or(get_route)
        .or(delete_route)
        .or(deposit_route)
        .or(withdraw_route)
        .or(transactions_route)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(service: AccountService, addr: SocketAddr) -> Result<()> {
    let api = api(Arc::new(service));
    let (bound, server) = warp::serve(api)
        .try_bind_with_graceful_shutdown(addr, async {
            // A failed signal listener just means we run until killed
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%bound, "listening");
    server.await;
    Ok(())
}

fn accounts() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path("api").and(warp::path("accounts"))
}

fn with_service(
    service: Service,
) -> impl Filter<Extract = (Service,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn json_body<T: DeserializeOwned + Send>()
-> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}
