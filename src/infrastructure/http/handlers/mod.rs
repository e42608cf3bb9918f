//! HTTP Handlers
//!
//! One function per route. Authenticated routes receive the resolved actor.

mod account;
mod auth;
mod static_files;

pub use account::*;
pub use auth::*;
pub use static_files::*;

use std::collections::HashMap;

use super::error::ApiError;
use crate::domain::ledger::AccountNum;

/// A form field that must be present.
fn required<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
    message: &str,
) -> Result<&'a str, ApiError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

/// `account_num` must be all digits; a well-formed number outside the
/// six-digit range cannot name an account.
fn account_num_param(params: &HashMap<String, String>) -> Result<AccountNum, ApiError> {
    let raw = required(
        params,
        "account_num",
        "account_num parameter value can only be digits",
    )?;
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "account_num parameter value can only be digits".to_string(),
        ));
    }
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Account not found: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_account_num_param() {
        assert_eq!(
            account_num_param(&params(&[("account_num", "123456")]))
                .unwrap()
                .value(),
            123_456
        );
        assert!(matches!(
            account_num_param(&params(&[("account_num", "12a")])),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            account_num_param(&params(&[("account_num", "-1")])),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            account_num_param(&params(&[])),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            account_num_param(&params(&[("account_num", "12")])),
            Err(ApiError::NotFound(_))
        ));
    }
}
