//! Account Handlers

use super::{account_num_param, required};
use crate::application::{CreateAccount, Deposit, GetAccount, Withdraw};
use crate::domain::identity::User;
use crate::infrastructure::http::dto::AccountDto;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::request::{parse_form, Request};
use crate::infrastructure::http::response::Response;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Account details
// ============================================================================

/// `GET /accountdetails?account_num=<digits>`
pub async fn get_account(state: &AppState, req: &Request, actor: User) -> Result<Response, ApiError> {
    let params = parse_form(req.query())?;
    let account_num = account_num_param(&params)?;

    let account = state
        .get_account_handler
        .handle(GetAccount { account_num, actor })
        .await?;

    Ok(Response::json(&AccountDto::from(&account))?)
}

// ============================================================================
// Create
// ============================================================================

/// `POST /createaccount` with `owner_name` and `balance`
pub async fn create_account(
    state: &AppState,
    req: &Request,
    actor: User,
) -> Result<Response, ApiError> {
    let params = parse_form(&req.body)?;
    let owner_name = required(&params, "owner_name", "missing required parameter owner_name")?;
    let balance = required(&params, "balance", "missing required parameter balance")?;

    let account = state
        .create_account_handler
        .handle(CreateAccount {
            owner_name: owner_name.to_string(),
            balance: balance.to_string(),
            actor,
        })
        .await?;

    Ok(Response::json(&AccountDto::from(&account))?)
}

// ============================================================================
// Deposit / Withdraw
// ============================================================================

/// `POST /deposit` with `account_num`, `amount` and optional `notes`
pub async fn deposit(state: &AppState, req: &Request, actor: User) -> Result<Response, ApiError> {
    let params = parse_form(&req.body)?;
    let account_num = account_num_param(&params)?;
    let amount = required(&params, "amount", "missing required parameter amount")?;
    let notes = params.get("notes").cloned().unwrap_or_default();

    let account = state
        .deposit_handler
        .handle(Deposit {
            account_num,
            amount: amount.to_string(),
            notes,
            actor,
        })
        .await?;

    Ok(Response::json(&AccountDto::from(&account))?)
}

/// `POST /withdraw` with `account_num`, `amount` and optional `notes`
pub async fn withdraw(state: &AppState, req: &Request, actor: User) -> Result<Response, ApiError> {
    let params = parse_form(&req.body)?;
    let account_num = account_num_param(&params)?;
    let amount = required(&params, "amount", "missing required parameter amount")?;
    let notes = params.get("notes").cloned().unwrap_or_default();

    let account = state
        .withdraw_handler
        .handle(Withdraw {
            account_num,
            amount: amount.to_string(),
            notes,
            actor,
        })
        .await?;

    Ok(Response::json(&AccountDto::from(&account))?)
}
