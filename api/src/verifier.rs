use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Decides whether an address can plausibly receive mail.
///
/// Implementations fail closed: any error means "not deliverable".
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn is_deliverable(&self, email: &str) -> bool;
}

#[derive(Debug, Default, Deserialize)]
struct Flag {
    #[serde(default)]
    value: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    deliverability: Option<String>,
    #[serde(default)]
    is_valid_format: Option<Flag>,
    #[serde(default)]
    is_disposable_email: Option<Flag>,
    #[serde(default)]
    is_role_email: Option<Flag>,
    #[serde(default)]
    is_smtp_valid: Option<Flag>,
}

impl ValidationResponse {
    fn passes(&self) -> bool {
        let flag = |flag: &Option<Flag>| flag.as_ref().and_then(|f| f.value);

        self.deliverability.as_deref() == Some("DELIVERABLE")
            && flag(&self.is_valid_format) == Some(true)
            && flag(&self.is_disposable_email) == Some(false)
            && flag(&self.is_role_email) == Some(false)
            && flag(&self.is_smtp_valid) == Some(true)
    }
}

/// Client for the Abstract email validation API.
#[derive(Debug, Clone)]
pub struct AbstractApiVerifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AbstractApiVerifier {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn lookup(&self, email: &str) -> Result<ValidationResponse, reqwest::Error> {
        self.client
            .get(format!("{}/v1/", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("email", email)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl EmailVerifier for AbstractApiVerifier {
    async fn is_deliverable(&self, email: &str) -> bool {
        match self.lookup(email).await {
            Ok(response) => {
                let passes = response.passes();
                tracing::debug!(
                    deliverability = ?response.deliverability,
                    passes,
                    "email verification finished"
                );
                passes
            }
            Err(e) => {
                tracing::error!("Email verification API error: {e}");
                false
            }
        }
    }
}
