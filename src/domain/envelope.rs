use serde::{Deserialize, Serialize};

use crate::utils::error::CargoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// 成功時為 `{"data": ...}`，失敗時為 `{"error": {"message": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T> {
    Data(T),
    Error(ErrorBody),
}

impl<T> Envelope<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(ErrorBody {
            message: message.into(),
        })
    }

    pub fn from_result(result: Result<T, CargoError>) -> Self {
        match result {
            Ok(data) => Envelope::Data(data),
            Err(e) => {
                tracing::warn!(
                    "Request failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Envelope::error(e.user_friendly_message())
            }
        }
    }

    pub fn into_result(self) -> Result<T, ErrorBody> {
        match self {
            Envelope::Data(data) => Ok(data),
            Envelope::Error(body) => Err(body),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let ok: Envelope<u32> = Envelope::Data(7);
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!({"data": 7}));

        let err: Envelope<u32> = Envelope::from_result(Err(CargoError::validation("invalid weight")));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"error": {"message": "Please check your input: invalid weight"}})
        );
    }
}
