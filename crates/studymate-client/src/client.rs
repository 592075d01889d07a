//! Combined client with access to every service.

use std::sync::Arc;

use tracing::info;

use studymate_core::{peers, Peer, PeerFilter};

use crate::board::TaskBoard;
use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::{AuthService, GroupService, TaskService, UserService, WorksessionService};

/// Combined client sharing one HTTP connection pool and credential provider.
#[derive(Clone)]
pub struct StudyClient {
    /// Login/logout.
    pub auth: AuthService,
    /// Task service client.
    pub tasks: TaskService,
    /// User service client.
    pub users: UserService,
    /// Group service client.
    pub groups: GroupService,
    /// Worksession service client.
    pub worksessions: WorksessionService,
}

impl StudyClient {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ClientError> {
        info!(api_url = %config.api_url, timeout_secs = config.timeout_secs, "Creating StudyMate client");
        let http = Arc::new(HttpClient::new(config, credentials)?);

        Ok(Self {
            auth: AuthService::new(http.clone()),
            tasks: TaskService::new(http.clone()),
            users: UserService::new(http.clone()),
            groups: GroupService::new(http.clone()),
            worksessions: WorksessionService::new(http),
        })
    }

    /// People and groups in one list, people first.
    pub async fn peers(&self, filter: PeerFilter) -> Result<Vec<Peer>, ClientError> {
        let (users, groups) =
            tokio::try_join!(self.users.list_users(), self.groups.list_groups())?;
        Ok(peers(&users, &groups, filter))
    }

    /// A task board backed by this client's task service.
    pub fn task_board(&self) -> TaskBoard<TaskService> {
        TaskBoard::new(self.tasks.clone())
    }
}
