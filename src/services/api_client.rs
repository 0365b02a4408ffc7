//! Blocking client for the users-admin HTTP API

use crate::model::employee::EmployeeDirectory;
use crate::model::news::NewsItem;
use crate::model::schema::FormSchema;
use crate::model::table::PageResponse;
use crate::model::user::{NewUser, User};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Error body returned by every endpoint
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn non-2xx responses into `ApiError::Status` using the JSON error body
    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{} ({})", error, details),
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).query(params).send()?;
        Ok(Self::check(response)?.json()?)
    }

    pub fn fetch_users(&self, params: &[(String, String)]) -> Result<PageResponse<User>, ApiError> {
        self.get_json("/api/users", params)
    }

    pub fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let response = self.http.post(self.url("/api/users")).json(user).send()?;
        Ok(Self::check(response)?.json()?)
    }

    pub fn update_user(&self, id: i64, user: &NewUser) -> Result<User, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/users/{}", id)))
            .json(user)
            .send()?;
        Ok(Self::check(response)?.json()?)
    }

    pub fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let response = self.http.delete(self.url(&format!("/api/users/{}", id))).send()?;
        Self::check(response)?;
        Ok(())
    }

    pub fn fetch_employees(&self) -> Result<EmployeeDirectory, ApiError> {
        self.get_json("/api/employee", &[])
    }

    pub fn fetch_news(&self) -> Result<Vec<NewsItem>, ApiError> {
        self.get_json("/api/news", &[])
    }

    pub fn fetch_register_schema(&self) -> Result<FormSchema, ApiError> {
        self.get_json("/api/schema/register", &[])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::server::{run, ServerState};
    use crate::services::store::UserStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::{mpsc, Arc};
    use std::thread;

    /// Start a server over an empty in-memory store on a free port
    pub(crate) fn spawn_server() -> SocketAddr {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                let store = UserStore::open_in_memory().unwrap();
                let employees = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/employee.json");
                let state = ServerState::with_rng(store, employees, StdRng::seed_from_u64(11));
                run(Arc::new(state), listener).await.unwrap();
            });
        });
        rx.recv().unwrap()
    }

    fn user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_round_trip_against_server() {
        let addr = spawn_server();
        let client = ApiClient::new(&format!("http://{}/", addr)).unwrap();

        let ann = client.create_user(&user("Ann", "ann@x.io")).unwrap();
        client.create_user(&user("Joe", "joe@x.io")).unwrap();

        let page = client
            .fetch_users(&[
                ("page".to_string(), "0".to_string()),
                ("pageSize".to_string(), "1".to_string()),
            ])
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].name, "Joe");

        let updated = client.update_user(ann.id, &user("Anna", "ann@x.io")).unwrap();
        assert_eq!(updated.name, "Anna");

        client.delete_user(ann.id).unwrap();
        match client.delete_user(ann.id) {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_validation_error_carries_server_message() {
        let addr = spawn_server();
        let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.create_user(&user("", "a@b.com")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: name and email required");
    }

    #[test]
    fn test_demo_endpoints() {
        let addr = spawn_server();
        let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
        assert!(!client.fetch_employees().unwrap().employees.is_empty());
        assert_eq!(client.fetch_register_schema().unwrap().title, "User Registration");
    }

    #[test]
    fn test_unreachable_server_is_network_error() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(client.fetch_news(), Err(ApiError::Network(_))));
    }
}
