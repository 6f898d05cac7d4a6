//! Service Client — a view over [`FabraicClient`] scoped to one service and version.
//!
//! Relative paths are templated (`{name}` placeholders) and prefixed with
//! `/<service>/<version>` before being handed to the base client.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde_json::Value;

use crate::client::{normalize_path, FabraicClient, RequestOptions};
use crate::error::{FabraicError, FabraicResult};
use crate::DEFAULT_SERVICE_VERSION;

/// Characters escaped in a substituted path parameter. Everything except the
/// unreserved set and the sub-delimiters allowed inside a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Client bound to one Fabraic service (e.g. `orders`) and API version.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Shared base client.
    client: FabraicClient,

    /// Service path without leading or trailing `/`.
    service_path: String,

    /// Version segment without leading or trailing `/`.
    version: String,
}

impl ServiceClient {
    /// Bind `client` to a service. Prefer [`FabraicClient::service`].
    pub fn new(
        client: FabraicClient,
        service_path: &str,
        version: Option<&str>,
    ) -> FabraicResult<Self> {
        let service_path = service_path.trim_matches('/');
        if service_path.is_empty() {
            return Err(FabraicError::Config(
                "service_path must be non-empty".into(),
            ));
        }

        let version = match version.map(|v| v.trim_matches('/')) {
            Some(v) if !v.is_empty() => v,
            _ => DEFAULT_SERVICE_VERSION,
        };

        Ok(Self {
            client,
            service_path: service_path.to_string(),
            version: version.to_string(),
        })
    }

    pub fn service_path(&self) -> &str {
        &self.service_path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The base client this service delegates to.
    pub fn client(&self) -> &FabraicClient {
        &self.client
    }

    /// Absolute path for `path`: `/<service>/<version>` plus the templated path.
    ///
    /// Each `{key}` is replaced by the escaped value. Placeholders without a
    /// matching key are left as-is.
    pub fn build_path(&self, path: &str, path_params: &[(&str, &str)]) -> String {
        let mut relative = normalize_path(path);
        for (key, value) in path_params {
            let placeholder = format!("{{{key}}}");
            let escaped = utf8_percent_encode(value, PATH_SEGMENT).to_string();
            relative = relative.replace(&placeholder, &escaped);
        }

        format!("/{}/{}{relative}", self.service_path, self.version)
    }

    /// Send one request to this service.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        let full_path = self.build_path(path, path_params);
        self.client.request(method, &full_path, options).await
    }

    pub async fn get(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        self.request(Method::GET, path, path_params, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        self.request(Method::POST, path, path_params, options).await
    }

    pub async fn put(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        self.request(Method::PUT, path, path_params, options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        self.request(Method::PATCH, path, path_params, options).await
    }

    pub async fn delete(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        self.request(Method::DELETE, path, path_params, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base(base_url: Option<&str>) -> FabraicClient {
        let mut config = ClientConfig::new().with_api_key("key-123");
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        FabraicClient::new(config).unwrap()
    }

    #[test]
    fn test_service_path_is_trimmed_and_version_defaults() {
        let orders = base(None).service("/orders/", None).unwrap();
        assert_eq!(orders.service_path(), "orders");
        assert_eq!(orders.version(), "v1");

        let orders = base(None).service("orders", Some("")).unwrap();
        assert_eq!(orders.version(), "v1");

        let billing = base(None).service("billing/invoices", Some("/v2/")).unwrap();
        assert_eq!(billing.version(), "v2");
    }

    #[test]
    fn test_empty_service_path() {
        for raw in ["", "/", "///"] {
            let err = base(None).service(raw, None).unwrap_err();
            assert!(matches!(err, FabraicError::Config(_)));
        }
    }

    #[test]
    fn test_build_path_substitutes_params() {
        let orders = base(None).service("orders/", Some("")).unwrap();
        assert_eq!(orders.build_path("/{id}", &[("id", "42")]), "/orders/v1/42");
        assert_eq!(orders.build_path("{id}", &[("id", "42")]), "/orders/v1/42");
        assert_eq!(
            orders.build_path("/{id}/lines/{id}", &[("id", "7")]),
            "/orders/v1/7/lines/7"
        );
    }

    #[test]
    fn test_build_path_escapes_values() {
        let files = base(None).service("files", None).unwrap();
        assert_eq!(
            files.build_path("/{name}", &[("name", "a b/c?d")]),
            "/files/v1/a%20b%2Fc%3Fd"
        );
        assert_eq!(
            files.build_path("/{name}", &[("name", "x:y@z")]),
            "/files/v1/x:y@z"
        );
        assert_eq!(
            files.build_path("/{name}", &[("name", "{other}")]),
            "/files/v1/%7Bother%7D"
        );
    }

    #[test]
    fn test_build_path_keeps_unfilled_placeholders() {
        let orders = base(None).service("orders", None).unwrap();
        assert_eq!(
            orders.build_path("/{id}/lines/{line}", &[("id", "42")]),
            "/orders/v1/42/lines/{line}"
        );
        assert_eq!(orders.build_path("/{id}", &[]), "/orders/v1/{id}");
    }

    #[test]
    fn test_services_share_base_client() {
        let client = base(None);
        let orders = client.service("orders", None).unwrap();
        let billing = client.service("billing", Some("v2")).unwrap();
        assert_eq!(orders.client().base_url(), billing.client().base_url());
    }

    #[tokio::test]
    async fn test_request_goes_to_scoped_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/v1/42"))
            .and(query_param("expand", "lines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
            .expect(1)
            .mount(&server)
            .await;

        let orders = base(Some(server.uri().as_str())).service("orders/", Some("")).unwrap();
        let value = orders
            .get("/{id}", &[("id", "42")], RequestOptions::new().query("expand", "lines"))
            .await
            .unwrap();
        assert_eq!(value, Some(json!({"id": "42"})));
    }

    #[tokio::test]
    async fn test_request_with_base_prefix_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/gateway/orders/v2/42/status"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = base(Some(format!("{}/gateway", server.uri()).as_str()));
        let orders = client.service("orders", Some("v2")).unwrap();
        let value = orders
            .patch(
                "{id}/status",
                &[("id", "42")],
                RequestOptions::new().json(&json!({"status": "shipped"})),
            )
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_api_error_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_string("order already shipped"))
            .mount(&server)
            .await;

        let orders = base(Some(server.uri().as_str())).service("orders", None).unwrap();
        let err = orders
            .delete("/{id}", &[("id", "42")], RequestOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "request failed (409): order already shipped");
    }
}
