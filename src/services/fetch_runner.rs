//! Background API request runner
//!
//! Each request runs on its own thread and reports back over a channel that
//! the UI drains on every tick, so the event loop never blocks on the network.

use crate::model::column::RowId;
use crate::model::employee::Employee;
use crate::model::news::NewsItem;
use crate::model::schema::FormSchema;
use crate::model::table::PageResponse;
use crate::model::user::{NewUser, User};
use crate::services::api_client::ApiClient;
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// Page size used to snapshot users for the client-side table
pub const SNAPSHOT_SIZE: usize = 500;

/// Work the runner can perform
#[derive(Debug, Clone)]
pub enum ApiRequest {
    /// One server page, tagged with the table's sequence number
    UsersPage {
        seq: u64,
        params: Vec<(String, String)>,
    },
    /// Newest users for the in-memory table
    UsersSnapshot,
    Employees,
    News,
    RegisterSchema,
    CreateUser(NewUser),
    UpdateUser {
        id: RowId,
        user: NewUser,
    },
    DeleteUsers(Vec<RowId>),
}

impl ApiRequest {
    fn label(&self) -> &'static str {
        match self {
            ApiRequest::UsersPage { .. } => "users page",
            ApiRequest::UsersSnapshot => "users snapshot",
            ApiRequest::Employees => "employees",
            ApiRequest::News => "news",
            ApiRequest::RegisterSchema => "register schema",
            ApiRequest::CreateUser(_) => "create user",
            ApiRequest::UpdateUser { .. } => "update user",
            ApiRequest::DeleteUsers(_) => "delete users",
        }
    }
}

/// Completed work delivered back to the UI
#[derive(Debug)]
pub enum ApiMessage {
    UsersPage {
        seq: u64,
        result: Result<PageResponse<User>, String>,
    },
    UsersSnapshot(Result<Vec<User>, String>),
    Employees(Result<Vec<Employee>, String>),
    News(Result<Vec<NewsItem>, String>),
    RegisterSchema(Result<FormSchema, String>),
    UserSaved {
        created: bool,
        result: Result<User, String>,
    },
    UsersDeleted {
        deleted: Vec<RowId>,
        failed: Vec<(RowId, String)>,
    },
}

pub struct FetchRunner {
    client: ApiClient,
    sender: Sender<ApiMessage>,
    receiver: Receiver<ApiMessage>,
    in_flight: usize,
}

impl FetchRunner {
    pub fn new(client: ApiClient) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Number of requests that have not reported back yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Run a request on a background thread
    pub fn spawn(&mut self, request: ApiRequest) {
        debug!("Dispatching {} request", request.label());
        let client = self.client.clone();
        let tx = self.sender.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let message = Self::execute(&client, request);
            // the receiver is gone only when the app is shutting down
            let _ = tx.send(message);
        });
    }

    /// Drain every completed request
    pub fn poll(&mut self) -> Vec<ApiMessage> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    messages.push(message);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }

    fn execute(client: &ApiClient, request: ApiRequest) -> ApiMessage {
        let label = request.label();
        let message = match request {
            ApiRequest::UsersPage { seq, params } => ApiMessage::UsersPage {
                seq,
                result: client.fetch_users(&params).map_err(|e| e.to_string()),
            },
            ApiRequest::UsersSnapshot => {
                let params = [
                    ("page".to_string(), "0".to_string()),
                    ("pageSize".to_string(), SNAPSHOT_SIZE.to_string()),
                ];
                ApiMessage::UsersSnapshot(
                    client
                        .fetch_users(&params)
                        .map(|page| page.data)
                        .map_err(|e| e.to_string()),
                )
            }
            ApiRequest::Employees => ApiMessage::Employees(
                client
                    .fetch_employees()
                    .map(|dir| dir.employees)
                    .map_err(|e| e.to_string()),
            ),
            ApiRequest::News => ApiMessage::News(client.fetch_news().map_err(|e| e.to_string())),
            ApiRequest::RegisterSchema => {
                ApiMessage::RegisterSchema(client.fetch_register_schema().map_err(|e| e.to_string()))
            }
            ApiRequest::CreateUser(user) => ApiMessage::UserSaved {
                created: true,
                result: client.create_user(&user).map_err(|e| e.to_string()),
            },
            ApiRequest::UpdateUser { id, user } => ApiMessage::UserSaved {
                created: false,
                result: client.update_user(id, &user).map_err(|e| e.to_string()),
            },
            ApiRequest::DeleteUsers(ids) => {
                let mut deleted = Vec::new();
                let mut failed = Vec::new();
                for id in ids {
                    match client.delete_user(id) {
                        Ok(()) => deleted.push(id),
                        Err(e) => failed.push((id, e.to_string())),
                    }
                }
                ApiMessage::UsersDeleted { deleted, failed }
            }
        };
        if message.is_failure() {
            warn!("{} request failed", label);
        }
        message
    }
}

impl ApiMessage {
    fn is_failure(&self) -> bool {
        match self {
            ApiMessage::UsersPage { result, .. } => result.is_err(),
            ApiMessage::UsersSnapshot(r) => r.is_err(),
            ApiMessage::Employees(r) => r.is_err(),
            ApiMessage::News(r) => r.is_err(),
            ApiMessage::RegisterSchema(r) => r.is_err(),
            ApiMessage::UserSaved { result, .. } => result.is_err(),
            ApiMessage::UsersDeleted { failed, .. } => !failed.is_empty(),
        }
    }
}
