//! Success summaries and the peer-style response envelope.
use super::error::EngineError;
use super::records::ShowRecord;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    None,
    Tickets(u8),
    Soda(u8),
    Shows(Vec<ShowRecord>),
}

/// `{trxnid, message, ...}` returned by a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub trxnid: String,
    pub message: String,
    pub detail: Detail,
}

impl Response {
    pub fn new(trxnid: &str, message: &str) -> Self {
        Self::with_detail(trxnid, message, Detail::None)
    }

    pub fn with_detail(trxnid: &str, message: &str, detail: Detail) -> Self {
        Self {
            trxnid: trxnid.to_string(),
            message: message.to_string(),
            detail,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "trxnid": self.trxnid,
            "message": self.message,
        });
        match &self.detail {
            Detail::None => {}
            Detail::Tickets(total) => out["ticketSold"] = json!(total),
            Detail::Soda(count) => out["sodaExchanged"] = json!(count),
            Detail::Shows(records) => out["records"] = json!(records),
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerResponse {
    pub status: u16,
    pub message: String,
    pub payload: Vec<u8>,
}

impl PeerResponse {
    pub const OK: u16 = 200;
    pub const ERROR: u16 = 500;

    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

impl From<&Result<Response, EngineError>> for PeerResponse {
    fn from(result: &Result<Response, EngineError>) -> Self {
        match result {
            Ok(response) => PeerResponse {
                status: Self::OK,
                message: String::new(),
                payload: response.to_json().to_string().into_bytes(),
            },
            Err(err) => {
                let body = err.to_json().to_string();
                PeerResponse {
                    status: Self::ERROR,
                    message: body.clone(),
                    payload: body.into_bytes(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sell_summary_carries_total() {
        let json = Response::with_detail("abc", "Sell ticket successfull", Detail::Tickets(60)).to_json();

        assert_eq!(json["trxnid"], "abc");
        assert_eq!(json["ticketSold"], 60);
        assert!(json.get("sodaExchanged").is_none());
    }

    #[test]
    fn plain_summary_has_two_fields() {
        let json = Response::new("abc", "Add Theatre Details Success").to_json();
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn peer_response_wraps_errors() {
        let result: Result<Response, EngineError> = Err(EngineError::NotEligible("ES13".into()));
        let peer = PeerResponse::from(&result);

        assert!(!peer.is_ok());
        let body: Value = serde_json::from_slice(&peer.payload).unwrap();
        assert_eq!(body["Data"], "ES13");
        assert_eq!(peer.message, body.to_string());
    }
}
