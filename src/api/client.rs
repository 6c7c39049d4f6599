use crate::api::api_types::ApiUser;
use crate::api::error::TransportError;
use crate::api::types::{User, UserData};
use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Record service client.
///
/// Stateless apart from the connection pool, so it is cheap to clone into
/// spawned tasks. Every call is a single attempt.
#[derive(Clone, Debug)]
pub struct UserClient {
  http: reqwest::Client,
  base_url: Url,
}

impl UserClient {
  pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
    let base_url = Url::parse(&config.base_url).map_err(|source| TransportError::InvalidUrl {
      url: config.base_url.clone(),
      source,
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = config.timeout() {
      builder = builder.timeout(timeout);
    }
    let http = builder.build().map_err(TransportError::Client)?;

    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Fetch all users in service order
  pub async fn list_users(&self) -> Result<Vec<User>, TransportError> {
    let users: Vec<ApiUser> = self.send_json(Method::GET, "/users", None).await?;
    Ok(users.into_iter().map(ApiUser::into_user).collect())
  }

  /// Create a user, returning the record as echoed by the service
  pub async fn create_user(&self, data: &UserData) -> Result<User, TransportError> {
    let user: ApiUser = self.send_json(Method::POST, "/users", Some(data)).await?;
    Ok(user.into_user())
  }

  /// Replace the record at `id`
  pub async fn update_user(&self, id: u64, data: &UserData) -> Result<User, TransportError> {
    let path = format!("/users/{}", id);
    let user: ApiUser = self.send_json(Method::PUT, &path, Some(data)).await?;
    Ok(user.into_user())
  }

  /// Delete the record at `id`.
  ///
  /// The body is whatever the service sends back: `Null` when empty, a JSON
  /// string when it is not JSON.
  pub async fn delete_user(&self, id: u64) -> Result<Value, TransportError> {
    let path = format!("/users/{}", id);
    let (url, response) = self.send(Method::DELETE, &path, None).await?;

    let text = response.text().await.map_err(|source| TransportError::Decode {
      method: Method::DELETE,
      url,
      source,
    })?;

    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
  }

  fn endpoint(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.base_url.as_str().trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  async fn send_json<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<&UserData>,
  ) -> Result<T, TransportError> {
    let (url, response) = self.send(method.clone(), path, body).await?;
    response
      .json::<T>()
      .await
      .map_err(|source| TransportError::Decode {
        method,
        url,
        source,
      })
  }

  /// Issue a request and reject non-success statuses
  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<&UserData>,
  ) -> Result<(String, Response), TransportError> {
    let url = self.endpoint(path);
    let mut request: RequestBuilder = self.http.request(method.clone(), &url);
    if let Some(body) = body {
      // Serialized by hand: `RequestBuilder::json` would replace the
      // client's default Content-Type with a bare `application/json`
      let bytes = serde_json::to_vec(body).map_err(|source| TransportError::Encode {
        method: method.clone(),
        url: url.clone(),
        source,
      })?;
      request = request.body(bytes);
    }

    debug!(%method, %url, "sending request");

    let response = request
      .send()
      .await
      .map_err(|source| TransportError::Request {
        method: method.clone(),
        url: url.clone(),
        source,
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(TransportError::Status {
        method,
        url,
        status,
      });
    }

    debug!(%method, %url, %status, "request succeeded");
    Ok((url, response))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;
  use serde_json::json;
  use wiremock::matchers::{body_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> UserClient {
    UserClient::new(&ApiConfig {
      base_url: server.uri(),
      timeout_secs: None,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn test_list_users_maps_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        { "id": 1, "name": "Leanne Graham", "email": "Sincere@april.biz", "phone": "1-770" },
        { "name": "No Id", "email": "none@x.com" }
      ])))
      .expect(1)
      .mount(&server)
      .await;

    let users = client_for(&server).list_users().await.unwrap();

    assert_eq!(
      users,
      vec![
        User {
          id: 1,
          name: "Leanne Graham".into(),
          email: "Sincere@april.biz".into(),
        },
        User {
          id: 0,
          name: "No Id".into(),
          email: "none@x.com".into(),
        },
      ]
    );
  }

  #[tokio::test]
  async fn test_create_user_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/users"))
      .and(header("content-type", JSON_CONTENT_TYPE))
      .and(body_json(json!({ "name": "Kim", "email": "k@x.com" })))
      .respond_with(
        ResponseTemplate::new(201).set_body_json(json!({ "id": 11, "name": "Kim", "email": "k@x.com" })),
      )
      .expect(1)
      .mount(&server)
      .await;

    let data = UserData {
      name: "Kim".into(),
      email: "k@x.com".into(),
    };
    let user = client_for(&server).create_user(&data).await.unwrap();

    assert_eq!(user.id, 11);
    assert_eq!(user.name, "Kim");
  }

  #[tokio::test]
  async fn test_write_requests_keep_charset_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/users"))
      .respond_with(
        ResponseTemplate::new(201).set_body_json(json!({ "id": 11, "name": "Kim", "email": "k@x.com" })),
      )
      .mount(&server)
      .await;

    let data = UserData {
      name: "Kim".into(),
      email: "k@x.com".into(),
    };
    client_for(&server).create_user(&data).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let content_types: Vec<&str> = received
      .iter()
      .filter_map(|r| r.headers.get("content-type"))
      .filter_map(|v| v.to_str().ok())
      .collect();
    assert_eq!(content_types, vec![JSON_CONTENT_TYPE]);
  }

  #[tokio::test]
  async fn test_update_user_puts_to_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/users/1"))
      .and(header("content-type", JSON_CONTENT_TYPE))
      .and(body_json(json!({ "name": "Leanne", "email": "c@d.com" })))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Leanne", "email": "c@d.com" })),
      )
      .expect(1)
      .mount(&server)
      .await;

    let data = UserData {
      name: "Leanne".into(),
      email: "c@d.com".into(),
    };
    let user = client_for(&server).update_user(1, &data).await.unwrap();

    assert_eq!(user.email, "c@d.com");
  }

  #[tokio::test]
  async fn test_delete_user_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/users/1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/users/2"))
      .respond_with(ResponseTemplate::new(204))
      .mount(&server)
      .await;

    let client = client_for(&server);
    assert_eq!(client.delete_user(1).await.unwrap(), json!({}));
    assert_eq!(client.delete_user(2).await.unwrap(), Value::Null);
  }

  #[tokio::test]
  async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/users/99"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let data = UserData {
      name: "x".into(),
      email: "x@y.z".into(),
    };
    let err = client_for(&server).update_user(99, &data).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
  }

  #[tokio::test]
  async fn test_connection_failure_is_transport_error() {
    let client = UserClient::new(&ApiConfig {
      base_url: "http://127.0.0.1:1".into(),
      timeout_secs: Some(2),
    })
    .unwrap();

    let err = client.list_users().await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }));
  }

  #[test]
  fn test_invalid_base_url() {
    let err = UserClient::new(&ApiConfig {
      base_url: "not a url".into(),
      timeout_secs: None,
    })
    .unwrap_err();
    assert!(matches!(err, TransportError::InvalidUrl { .. }));
  }

  #[test]
  fn test_endpoint_joins_paths() {
    let client = UserClient::new(&ApiConfig {
      base_url: "https://example.com/api/".into(),
      timeout_secs: None,
    })
    .unwrap();
    assert_eq!(client.endpoint("/users/3"), "https://example.com/api/users/3");
  }
}
