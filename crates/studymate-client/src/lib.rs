//! Client library for the StudyMate backend.
//!
//! Provides thin HTTP services per resource, an injected credential provider,
//! and the [`TaskBoard`] that applies reconciled task changes optimistically.

pub mod auth;
pub mod board;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod peers;
pub mod tasks;
pub mod wire;
pub mod worksessions;

pub use auth::AuthService;
pub use board::{TaskBoard, TaskStore};
pub use client::StudyClient;
pub use config::ClientConfig;
pub use credentials::{CredentialProvider, MemoryCredentials, Session};
pub use error::ClientError;
pub use http::HttpClient;
pub use peers::{GroupService, UserService};
pub use tasks::TaskService;
pub use worksessions::WorksessionService;
