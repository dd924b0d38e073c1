use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::ResultSource;
use super::client::ServiceClient;
use crate::types::{CheckResult, User};

#[derive(Debug, Deserialize)]
struct ResultsResource {
    #[serde(default)]
    results: Vec<CheckResult>,
}

/// Result history service over HTTP JSON
pub struct HttpResultSource {
    client: ServiceClient,
}

impl HttpResultSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { client: ServiceClient::new("results", endpoint, timeout)? })
    }

    async fn query(&self, user: &User, query: String) -> Result<Vec<CheckResult>> {
        let request = self.client.request(user, Method::GET, &["results"])?.query(&[("q", query)]);
        let resource: ResultsResource = self.client.send_json(request).await?;
        Ok(resource.results)
    }
}

/// Escape a value for use inside a double-quoted query string literal
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn results_query(customer_id: &str, check_id: Option<&str>) -> String {
    let mut query = format!("customer_id = {} and type = \"result\"", quote(customer_id));
    if let Some(check_id) = check_id {
        query.push_str(&format!(" and service = {}", quote(check_id)));
    }
    query
}

#[async_trait]
impl ResultSource for HttpResultSource {
    async fn list_results(&self, user: &User) -> Result<Vec<CheckResult>> {
        self.query(user, results_query(&user.customer_id, None)).await
    }

    async fn list_results_for_check(&self, user: &User, check_id: &str) -> Result<Vec<CheckResult>> {
        self.query(user, results_query(&user.customer_id, Some(check_id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_query_scopes_to_check() {
        assert_eq!(results_query("t1", None), r#"customer_id = "t1" and type = "result""#);
        assert_eq!(
            results_query("t1", Some("c1")),
            r#"customer_id = "t1" and type = "result" and service = "c1""#
        );
    }

    #[test]
    fn test_results_query_escapes_quotes() {
        assert_eq!(
            results_query("t1", Some(r#"c1" or customer_id = "t2"#)),
            r#"customer_id = "t1" and type = "result" and service = "c1\" or customer_id = \"t2""#
        );
        assert_eq!(results_query(r"t\1", None), r#"customer_id = "t\\1" and type = "result""#);
    }
}
