//! Turning data-source results into lifecycle settlements.
//!
//! ```text
//! Ok(success: true,  data)        → Fulfilled(data)
//! Ok(success: false, "message")   → Rejected("message")
//! Ok(success: false, no message)  → Rejected(fallback)
//! Ok(success: true,  no data)     → Rejected(fallback), logged
//! Err(SourceError)                → Rejected(fallback), logged
//! ```

use tracing::error;

use crm_core::{ApiResponse, CoreError, Settlement};
use crm_data::SourceResult;

/// A store operation: its log name and the message shown on a fault.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operation {
    pub name: &'static str,
    pub fallback: &'static str,
}

impl Operation {
    pub const fn new(name: &'static str, fallback: &'static str) -> Self {
        Operation { name, fallback }
    }

    /// Settles a call that must carry a payload.
    pub fn settle<T>(&self, outcome: SourceResult<ApiResponse<T>>) -> Settlement<T> {
        match outcome {
            Ok(response) => match response.into_result(self.name) {
                Ok(data) => Settlement::Fulfilled(data),
                Err(err) => self.reject(err),
            },
            Err(err) => self.fault(&err),
        }
    }

    /// Settles a call whose payload is null by contract.
    pub fn settle_ack(&self, outcome: SourceResult<ApiResponse<()>>) -> Settlement<()> {
        match outcome {
            Ok(response) => match response.into_ack() {
                Ok(()) => Settlement::Fulfilled(()),
                Err(err) => self.reject(err),
            },
            Err(err) => self.fault(&err),
        }
    }

    /// Settles a call that resolves straight to a value.
    pub fn settle_value<T>(&self, outcome: SourceResult<T>) -> Settlement<T> {
        match outcome {
            Ok(value) => Settlement::Fulfilled(value),
            Err(err) => self.fault(&err),
        }
    }

    fn reject<T>(&self, err: CoreError) -> Settlement<T> {
        match err {
            CoreError::Rejected(message) if !message.trim().is_empty() => {
                Settlement::Rejected(message)
            }
            CoreError::Rejected(_) => Settlement::Rejected(self.fallback.to_string()),
            other => self.fault(&other),
        }
    }

    fn fault<T>(&self, err: &dyn std::error::Error) -> Settlement<T> {
        error!(operation = self.name, error = %err, "{}", self.fallback);
        Settlement::Rejected(self.fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_data::SourceError;

    const FETCH: Operation = Operation::new("customers.fetch_list", "Failed to fetch customers");

    #[test]
    fn test_success_is_fulfilled() {
        let settled = FETCH.settle(Ok(ApiResponse::ok(3, "ok")));
        assert_eq!(settled, Settlement::Fulfilled(3));
    }

    #[test]
    fn test_failure_message_is_verbatim() {
        let settled: Settlement<i32> = FETCH.settle(Ok(ApiResponse::failure("Customer not found")));
        assert_eq!(settled, Settlement::Rejected("Customer not found".into()));
    }

    #[test]
    fn test_blank_failure_message_falls_back() {
        let settled: Settlement<i32> = FETCH.settle(Ok(ApiResponse::failure("")));
        assert_eq!(settled, Settlement::Rejected("Failed to fetch customers".into()));
    }

    #[test]
    fn test_fault_falls_back() {
        let settled: Settlement<i32> = FETCH.settle(Err(SourceError::unavailable("down")));
        assert_eq!(settled, Settlement::Rejected("Failed to fetch customers".into()));
    }

    #[test]
    fn test_success_without_data_falls_back() {
        let response = ApiResponse::<i32> {
            success: true,
            data: None,
            message: None,
        };
        assert_eq!(
            FETCH.settle(Ok(response)),
            Settlement::Rejected("Failed to fetch customers".into())
        );
    }

    #[test]
    fn test_ack_ignores_missing_data() {
        let response = ApiResponse::<()> {
            success: true,
            data: None,
            message: Some("Customer deleted successfully".into()),
        };
        assert_eq!(FETCH.settle_ack(Ok(response)), Settlement::Fulfilled(()));
    }
}
