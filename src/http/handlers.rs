use std::sync::Arc;

use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::application::AccountService;
use crate::domain::AccountId;

use super::error::reject;
use super::requests::{AmountRequest, CreateAccountRequest, TransferRequest};

pub type Service = Arc<AccountService>;

pub const ACCOUNT_DELETED: &str = "account is deleted";
pub const TRANSFER_COMPLETED: &str = "Transfer Successfully";

pub async fn create_account(
    service: Service,
    req: CreateAccountRequest,
) -> Result<impl Reply, Rejection> {
    let new_account = req.into_new_account().map_err(reject)?;
    let account = service.create_account(new_account).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&account),
        StatusCode::CREATED,
    ))
}

pub async fn get_account(id: AccountId, service: Service) -> Result<impl Reply, Rejection> {
    let account = service.get_account(id).await.map_err(reject)?;
    Ok(warp::reply::json(&account))
}

pub async fn list_accounts(service: Service) -> Result<impl Reply, Rejection> {
    let accounts = service.list_accounts().await.map_err(reject)?;
    Ok(warp::reply::json(&accounts))
}

pub async fn delete_account(id: AccountId, service: Service) -> Result<impl Reply, Rejection> {
    service.delete_account(id).await.map_err(reject)?;
    Ok(ACCOUNT_DELETED)
}

pub async fn deposit(
    id: AccountId,
    service: Service,
    req: AmountRequest,
) -> Result<impl Reply, Rejection> {
    let amount = req.amount_cents().map_err(reject)?;
    let account = service.deposit(id, amount).await.map_err(reject)?;
    Ok(warp::reply::json(&account))
}

pub async fn withdraw(
    id: AccountId,
    service: Service,
    req: AmountRequest,
) -> Result<impl Reply, Rejection> {
    let amount = req.amount_cents().map_err(reject)?;
    let account = service.withdraw(id, amount).await.map_err(reject)?;
    Ok(warp::reply::json(&account))
}

pub async fn transfer(service: Service, req: TransferRequest) -> Result<impl Reply, Rejection> {
    let amount = req.amount_cents().map_err(reject)?;
    service
        .transfer_funds(req.from_account_id, req.to_account_id, amount)
        .await
        .map_err(reject)?;
    Ok(TRANSFER_COMPLETED)
}

pub async fn list_transactions(id: AccountId, service: Service) -> Result<impl Reply, Rejection> {
    let transactions = service.list_transactions(id).await.map_err(reject)?;
    Ok(warp::reply::json(&transactions))
}
