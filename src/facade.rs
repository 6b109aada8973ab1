/// Domain facade
///
/// `Taskdeck` composes the auth service, entity store, quick-add parser,
/// and query engine into the operation surface a transport layer would
/// call. Every operation takes the caller's session token, resolves it to a
/// principal through the auth choke point, and passes that principal
/// explicitly to the store — there is no ambient session state anywhere.
///
/// Errors from the parts pass through unchanged; mapping them to
/// user-facing responses is the transport's job. When a per-operation
/// timeout is configured, an operation that exceeds it fails with
/// `Error::Timeout` without having mutated anything.
///
/// # Example
///
/// ```no_run
/// use taskdeck::auth::RegisterInput;
/// use taskdeck::config::Config;
/// use taskdeck::facade::Taskdeck;
///
/// # async fn example() -> taskdeck::Result<()> {
/// let deck = Taskdeck::new(Config::default());
///
/// let (_, token) = deck
///     .register(RegisterInput {
///         username: "alice".into(),
///         email: "alice@example.com".into(),
///         password: "Sup3rSecret".into(),
///     })
///     .await?;
///
/// let task = deck.quick_add(&token, "Buy milk #errands !high tomorrow").await?;
/// assert_eq!(task.title, "Buy milk");
/// # Ok(())
/// # }
/// ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::{AuthService, RegisterInput};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    CreateProject, CreateTag, CreateTask, Project, Tag, Task, UpdateProject, UpdateTag,
    UpdateTask, User,
};
use crate::query::{self, TaskFilter};
use crate::quickadd::{self, TaskDraft};
use crate::store::Store;

/// The operation surface of the domain core
pub struct Taskdeck {
    store: Arc<Store>,
    auth: AuthService,
    clock: Arc<dyn Clock>,
    op_timeout: Option<Duration>,
}

impl Taskdeck {
    /// Builds a facade on the system clock
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds a facade on an injected clock (tests, replay)
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(Store::new(clock.clone()));
        let auth = AuthService::new(store.clone(), config.jwt, clock.clone());
        Self {
            store,
            auth,
            clock,
            op_timeout: config.op_timeout,
        }
    }

    /// Applies the configured deadline, if any, to one operation
    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match self.op_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout),
            },
            None => operation.await,
        }
    }

    /// Resolves the session token, bounded like any other operation
    async fn principal(&self, token: &str) -> Result<User> {
        self.bounded(self.auth.resolve_principal(token)).await
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Registers an account and returns it with a fresh session token
    pub async fn register(&self, input: RegisterInput) -> Result<(User, String)> {
        self.bounded(self.auth.register(input)).await
    }

    /// Verifies a credential and returns a session token
    pub async fn login(&self, identity: &str, password: &str) -> Result<String> {
        self.bounded(self.auth.authenticate(identity, password)).await
    }

    /// Returns the user behind a session token
    pub async fn current_user(&self, token: &str) -> Result<User> {
        self.principal(token).await
    }

    /// Deletes the authenticated account and everything it owns
    ///
    /// This is the administrative cascade: projects, tags, tasks, and
    /// associations all go atomically.
    pub async fn delete_account(&self, token: &str) -> Result<()> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.delete_user(principal.id)).await
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Creates a project for the caller
    pub async fn create_project(&self, token: &str, input: CreateProject) -> Result<Project> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.create_project(principal.id, input))
            .await
    }

    /// Gets one of the caller's projects
    pub async fn get_project(&self, token: &str, id: Uuid) -> Result<Project> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.get_project(principal.id, id)).await
    }

    /// Lists the caller's projects, newest first
    pub async fn list_projects(&self, token: &str) -> Result<Vec<Project>> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.list_projects(principal.id)).await
    }

    /// Partially updates one of the caller's projects
    pub async fn update_project(
        &self,
        token: &str,
        id: Uuid,
        input: UpdateProject,
    ) -> Result<Project> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.update_project(principal.id, id, input))
            .await
    }

    /// Deletes one of the caller's projects; its tasks survive unfiled
    pub async fn delete_project(&self, token: &str, id: Uuid) -> Result<()> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.delete_project(principal.id, id))
            .await
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Creates a tag for the caller
    pub async fn create_tag(&self, token: &str, input: CreateTag) -> Result<Tag> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.create_tag(principal.id, input)).await
    }

    /// Lists the caller's tags, sorted by name
    pub async fn list_tags(&self, token: &str) -> Result<Vec<Tag>> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.list_tags(principal.id)).await
    }

    /// Partially updates one of the caller's tags
    pub async fn update_tag(&self, token: &str, id: Uuid, input: UpdateTag) -> Result<Tag> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.update_tag(principal.id, id, input))
            .await
    }

    /// Deletes one of the caller's tags; tagged tasks survive
    pub async fn delete_tag(&self, token: &str, id: Uuid) -> Result<()> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.delete_tag(principal.id, id)).await
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Creates a task from structured fields
    pub async fn create_task(&self, token: &str, input: CreateTask) -> Result<Task> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.create_task(principal.id, input))
            .await
    }

    /// Creates a task from one free-text line
    ///
    /// Parses the text with the quick-add grammar, then stores the draft:
    /// extracted tag names are resolved against the caller's tags, creating
    /// any that are missing.
    pub async fn quick_add(&self, token: &str, text: &str) -> Result<Task> {
        let principal = self.principal(token).await?;
        let draft = quickadd::parse(text, self.clock.now())?;

        let input = CreateTask {
            title: draft.title,
            due_date: draft.due_date,
            priority: Some(draft.priority),
            tags: draft.tags.into_iter().collect(),
            ..Default::default()
        };
        self.bounded(self.store.create_task(principal.id, input))
            .await
    }

    /// Parses quick-add text without creating anything
    pub async fn parse_preview(&self, token: &str, text: &str) -> Result<TaskDraft> {
        self.principal(token).await?;
        quickadd::parse(text, self.clock.now())
    }

    /// Gets one of the caller's tasks
    pub async fn get_task(&self, token: &str, id: Uuid) -> Result<Task> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.get_task(principal.id, id)).await
    }

    /// Lists the caller's tasks under a filter and the default ordering
    pub async fn list_tasks(&self, token: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let principal = self.principal(token).await?;
        let tasks = self.bounded(self.store.list_tasks(principal.id)).await?;
        Ok(query::select(filter, tasks))
    }

    /// Partially updates one of the caller's tasks
    pub async fn update_task(&self, token: &str, id: Uuid, input: UpdateTask) -> Result<Task> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.update_task(principal.id, id, input))
            .await
    }

    /// Deletes one of the caller's tasks
    pub async fn delete_task(&self, token: &str, id: Uuid) -> Result<()> {
        let principal = self.principal(token).await?;
        self.bounded(self.store.delete_task(principal.id, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_surfaces_timeout() {
        let mut config = Config::default();
        config.op_timeout = Some(Duration::from_millis(50));
        let deck = Taskdeck::new(config);

        // An operation that never completes must fail with Timeout once the
        // deadline passes, not hang.
        let result = deck.bounded(std::future::pending::<Result<()>>()).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn test_without_deadline_operations_are_unbounded() {
        let deck = Taskdeck::new(Config::default());
        let result = deck.bounded(async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
