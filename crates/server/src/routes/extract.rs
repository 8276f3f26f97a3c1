use std::{collections::HashMap, convert::Infallible};

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};

/// Named request fields, read like an HTML form handler reads them: urlencoded
/// body fields first, then query-string fields. A body of any other type, or
/// one that does not parse, contributes nothing. Absent fields are empty.
#[derive(Debug, Default, Clone)]
pub struct FormValues(HashMap<String, String>);

impl FormValues {
    pub fn value(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_default()
    }

    // first occurrence of a key wins
    fn extend_missing(&mut self, pairs: Vec<(String, String)>) {
        for (key, value) in pairs {
            self.0.entry(key).or_insert(value);
        }
    }
}

fn is_urlencoded(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S> FromRequest<S> for FormValues
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_owned);
        let mut values = FormValues::default();

        if is_urlencoded(&req) {
            if let Ok(body) = Bytes::from_request(req, state).await {
                values.extend_missing(serde_urlencoded::from_bytes(&body).unwrap_or_default());
            }
        }
        if let Some(query) = query {
            values.extend_missing(serde_urlencoded::from_str(&query).unwrap_or_default());
        }
        Ok(values)
    }
}
