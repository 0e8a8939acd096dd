use crate::{ErrorCode, ScrapingError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured company profile data pulled from a LinkedIn page.
///
/// Only `name` and `linkedin_url` are guaranteed; every other field is best-effort
/// and `None` means the page did not carry it in a recognisable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Company homepage, with LinkedIn redirect wrappers removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// The canonical URL the profile page declares for itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// The profile URL that was requested, in canonical form.
    pub linkedin_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
}

/// Uniform envelope returned by every public scrape operation.
///
/// `data` is set iff `success`; `error` and `error_code` are set iff not.
/// `timestamp` is always the capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ScrapingResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            timestamp: Utc::now(),
        }
    }

    pub fn err(error: &ScrapingError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_code: Some(error.code()),
            timestamp: Utc::now(),
        }
    }
}

impl<T> From<crate::Result<T>> for ScrapingResult<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompanyData {
        CompanyData {
            name: "Acme Corp".to_string(),
            description: None,
            website: Some("https://acme.example".to_string()),
            company_url: None,
            industry: None,
            company_size: None,
            headquarters: None,
            founded: Some(1999),
            specialties: None,
            logo: None,
            linkedin_url: "https://www.linkedin.com/company/acme-corp/".to_string(),
            followers: None,
        }
    }

    #[test]
    fn test_success_envelope() {
        let result = ScrapingResult::ok(sample());
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.error_code.is_none());
        assert_eq!(result.data.unwrap().name, "Acme Corp");
    }

    #[test]
    fn test_failure_envelope() {
        let err = ScrapingError::NotFound {
            url: "https://www.linkedin.com/company/nope/".to_string(),
            status: 404,
        };
        let result: ScrapingResult<CompanyData> = ScrapingResult::err(&err);
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error_code, Some(ErrorCode::NotFound));
        assert!(result.error.as_deref().unwrap().contains("404"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(ScrapingResult::ok(sample())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["linkedinUrl"], "https://www.linkedin.com/company/acme-corp/");
        assert_eq!(json["data"]["founded"], 1999);
        assert!(json["data"].get("followers").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("timestamp").is_some());
    }
}
