use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuantity {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Envelope every stock endpoint answers with. `code` mirrors the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data,
        }
    }

    pub fn failed(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_carries_no_data() {
        let response: ApiResponse<StockQuantity> = ApiResponse::failed(409, "insufficient stock");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], 409);
        assert_eq!(json["message"], "insufficient stock");
        assert!(json["data"].is_null());
        assert!(!response.is_success());
    }

    #[test]
    fn reserve_request_parses_from_json() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"product_id":"{}","quantity":3}}"#, id);
        let request: ReserveRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(request.product_id, id);
        assert_eq!(request.quantity, 3);
    }
}
