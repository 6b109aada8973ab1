/// Entity store with per-user isolation
///
/// In-memory store for users, projects, tags, and tasks. Every operation
/// takes an explicit principal id — never ambient state — and anything the
/// principal does not own behaves exactly like something that does not
/// exist (`Error::NotFound`).
///
/// # Concurrency
///
/// All state sits behind a single `tokio::sync::RwLock`. Mutations take the
/// write lock, so per-entity updates are serialized in arrival order and
/// cascades are atomic: a concurrent reader sees the pre-delete state or the
/// fully post-cascade state, never a partial one. Updates additionally
/// support optimistic versioning via `expected_version`.
///
/// # Cascade rules
///
/// - delete user: all owned projects, tags, tasks, and associations go
/// - delete project: its tasks survive with `project_id` cleared
/// - delete tag: only the task associations are removed
///
/// # Example
///
/// ```no_run
/// use taskdeck::clock::SystemClock;
/// use taskdeck::models::CreateTask;
/// use taskdeck::store::Store;
/// use std::sync::Arc;
///
/// # async fn example() -> taskdeck::Result<()> {
/// let store = Store::new(Arc::new(SystemClock));
/// let user = store.insert_user("alice", "alice@example.com", "$argon2id$...".into()).await?;
///
/// let task = store
///     .create_task(user.id, CreateTask { title: "Buy milk".into(), ..Default::default() })
///     .await?;
/// assert_eq!(task.user_id, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{
    CreateProject, CreateTag, CreateTask, Project, Tag, Task, UpdateProject, UpdateTag,
    UpdateTask, User, DEFAULT_PROJECT_COLOR, DEFAULT_TAG_COLOR,
};

/// Principal-scoped entity store
pub struct Store {
    inner: RwLock<State>,
    clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,

    /// Username -> user id, exact-match uniqueness
    usernames: HashMap<String, Uuid>,

    /// Lowercased email -> user id
    emails: HashMap<String, Uuid>,

    projects: HashMap<Uuid, Project>,
    tags: HashMap<Uuid, Tag>,

    /// (owner, lowercased name) -> tag id; backs case-insensitive uniqueness
    tag_names: HashMap<(Uuid, String), Uuid>,

    tasks: HashMap<Uuid, Task>,
}

impl State {
    /// Resolves tag names to ids for one owner, creating missing tags
    ///
    /// Matching is case-insensitive; a newly created tag keeps the caller's
    /// casing and gets the default color.
    fn resolve_or_create_tags(
        &mut self,
        principal: Uuid,
        names: &[String],
        now: DateTime<Utc>,
    ) -> Result<BTreeSet<Uuid>> {
        // Validate every name before creating anything; failing midway must
        // not leave earlier tags behind.
        let mut trimmed = Vec::with_capacity(names.len());
        for raw in names {
            let name = raw.trim();
            if name.is_empty() {
                return Err(Error::validation("tags", "tag names must not be empty"));
            }
            trimmed.push(name);
        }

        let mut ids = BTreeSet::new();

        for name in trimmed {
            let key = (principal, name.to_lowercase());
            let id = match self.tag_names.get(&key) {
                Some(id) => *id,
                None => {
                    let tag = Tag {
                        id: Uuid::new_v4(),
                        user_id: principal,
                        name: name.to_string(),
                        color: DEFAULT_TAG_COLOR.to_string(),
                        created_at: now,
                    };
                    let id = tag.id;
                    self.tag_names.insert(key, id);
                    self.tags.insert(id, tag);
                    id
                }
            };
            ids.insert(id);
        }

        Ok(ids)
    }

    /// Checks that a project reference belongs to the principal
    ///
    /// Absent and foreign projects produce the same message, so a task
    /// create cannot probe other users' project ids.
    fn check_project_ref(&self, principal: Uuid, project_id: Uuid) -> Result<()> {
        match self.projects.get(&project_id) {
            Some(p) if p.user_id == principal => Ok(()),
            _ => Err(Error::validation("project_id", "unknown project")),
        }
    }

    fn check_version(actual: i64, expected: Option<i64>) -> Result<()> {
        if let Some(expected) = expected {
            if expected != actual {
                return Err(Error::Conflict { expected, actual });
            }
        }
        Ok(())
    }
}

impl Store {
    /// Creates an empty store using the given clock for timestamps
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(State::default()),
            clock,
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Inserts a new user
    ///
    /// Username uniqueness is exact; email uniqueness is case-insensitive
    /// and the stored email is lowercased.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when the username or email is already taken.
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> Result<User> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let email = email.to_lowercase();
        if state.usernames.contains_key(username) {
            return Err(Error::validation("username", "username already exists"));
        }
        if state.emails.contains_key(&email) {
            return Err(Error::validation("email", "email already exists"));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash,
            created_at: now,
        };

        state.usernames.insert(user.username.clone(), user.id);
        state.emails.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    /// Finds a user by username (exact) or email (case-insensitive)
    pub async fn find_user_by_identity(&self, identity: &str) -> Option<User> {
        let state = self.inner.read().await;
        let id = state
            .usernames
            .get(identity)
            .or_else(|| state.emails.get(&identity.to_lowercase()))?;
        state.users.get(id).cloned()
    }

    /// Deletes a user and everything it owns
    ///
    /// Cascades atomically: all projects, tags, tasks, and task-tag
    /// associations owned by the user are removed under one write lock.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.write().await;

        let user = state.users.remove(&id).ok_or(Error::NotFound("user"))?;
        state.usernames.remove(&user.username);
        state.emails.remove(&user.email);

        state.projects.retain(|_, p| p.user_id != id);
        state.tags.retain(|_, t| t.user_id != id);
        state.tag_names.retain(|(owner, _), _| *owner != id);
        state.tasks.retain(|_, t| t.user_id != id);

        tracing::info!(user_id = %id, "deleted user and owned entities");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Creates a project for the principal
    pub async fn create_project(&self, principal: Uuid, data: CreateProject) -> Result<Project> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let name = data.name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "name is required"));
        }

        let project = Project {
            id: Uuid::new_v4(),
            user_id: principal,
            name: name.to_string(),
            description: data.description,
            color: data
                .color
                .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
            archived: false,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        state.projects.insert(project.id, project.clone());
        tracing::debug!(user_id = %principal, project_id = %project.id, "created project");
        Ok(project)
    }

    /// Gets one of the principal's projects
    pub async fn get_project(&self, principal: Uuid, id: Uuid) -> Result<Project> {
        let state = self.inner.read().await;
        state
            .projects
            .get(&id)
            .filter(|p| p.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("project"))
    }

    /// Lists the principal's projects, newest first
    pub async fn list_projects(&self, principal: Uuid) -> Result<Vec<Project>> {
        let state = self.inner.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.user_id == principal)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Applies a partial update to one of the principal's projects
    pub async fn update_project(
        &self,
        principal: Uuid,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Project> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let project = state
            .projects
            .get_mut(&id)
            .filter(|p| p.user_id == principal)
            .ok_or(Error::NotFound("project"))?;

        State::check_version(project.version, data.expected_version)?;

        if let Some(name) = data.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::validation("name", "name is required"));
            }
            project.name = name;
        }
        if let Some(description) = data.description {
            project.description = description;
        }
        if let Some(color) = data.color {
            project.color = color;
        }
        if let Some(archived) = data.archived {
            project.archived = archived;
        }

        project.updated_at = now;
        project.version += 1;

        tracing::debug!(user_id = %principal, project_id = %id, "updated project");
        Ok(project.clone())
    }

    /// Deletes one of the principal's projects
    ///
    /// Its tasks survive with their project reference cleared; the null-out
    /// happens under the same write lock as the delete.
    pub async fn delete_project(&self, principal: Uuid, id: Uuid) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let owned = state
            .projects
            .get(&id)
            .map(|p| p.user_id == principal)
            .unwrap_or(false);
        if !owned {
            return Err(Error::NotFound("project"));
        }
        state.projects.remove(&id);

        for task in state.tasks.values_mut() {
            if task.project_id == Some(id) {
                task.project_id = None;
                task.updated_at = now;
                task.version += 1;
            }
        }

        tracing::debug!(user_id = %principal, project_id = %id, "deleted project");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Creates a tag for the principal
    ///
    /// # Errors
    ///
    /// `Error::Validation` when a tag with the same name (ignoring case)
    /// already exists for this user.
    pub async fn create_tag(&self, principal: Uuid, data: CreateTag) -> Result<Tag> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let name = data.name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "name is required"));
        }

        let key = (principal, name.to_lowercase());
        if state.tag_names.contains_key(&key) {
            return Err(Error::validation("name", "tag already exists"));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: principal,
            name: name.to_string(),
            color: data.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            created_at: now,
        };

        state.tag_names.insert(key, tag.id);
        state.tags.insert(tag.id, tag.clone());

        tracing::debug!(user_id = %principal, tag_id = %tag.id, "created tag");
        Ok(tag)
    }

    /// Gets one of the principal's tags
    pub async fn get_tag(&self, principal: Uuid, id: Uuid) -> Result<Tag> {
        let state = self.inner.read().await;
        state
            .tags
            .get(&id)
            .filter(|t| t.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("tag"))
    }

    /// Lists the principal's tags, sorted by name
    pub async fn list_tags(&self, principal: Uuid) -> Result<Vec<Tag>> {
        let state = self.inner.read().await;
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| t.user_id == principal)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(tags)
    }

    /// Applies a partial update to one of the principal's tags
    ///
    /// A rename must not collide with another tag of the same user
    /// (case-insensitive); renaming a tag to its own name is allowed.
    pub async fn update_tag(&self, principal: Uuid, id: Uuid, data: UpdateTag) -> Result<Tag> {
        let mut state = self.inner.write().await;

        let current = state
            .tags
            .get(&id)
            .filter(|t| t.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("tag"))?;

        if let Some(name) = &data.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::validation("name", "name is required"));
            }

            let new_key = (principal, name.to_lowercase());
            if let Some(existing) = state.tag_names.get(&new_key) {
                if *existing != id {
                    return Err(Error::validation("name", "tag name already exists"));
                }
            }

            state.tag_names.remove(&(principal, current.name.to_lowercase()));
            state.tag_names.insert(new_key, id);

            let tag = state.tags.get_mut(&id).ok_or(Error::NotFound("tag"))?;
            tag.name = name.to_string();
        }

        let tag = state.tags.get_mut(&id).ok_or(Error::NotFound("tag"))?;
        if let Some(color) = data.color {
            tag.color = color;
        }

        tracing::debug!(user_id = %principal, tag_id = %id, "updated tag");
        Ok(tag.clone())
    }

    /// Deletes one of the principal's tags
    ///
    /// Removes the tag from every task that carries it; the tasks survive.
    pub async fn delete_tag(&self, principal: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.inner.write().await;

        let tag = state
            .tags
            .get(&id)
            .filter(|t| t.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("tag"))?;

        state.tags.remove(&id);
        state.tag_names.remove(&(principal, tag.name.to_lowercase()));

        for task in state.tasks.values_mut() {
            task.tag_ids.remove(&id);
        }

        tracing::debug!(user_id = %principal, tag_id = %id, "deleted tag");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Creates a task for the principal
    ///
    /// Validates the title, checks any project reference against the
    /// principal's projects, and resolves tag names (creating missing tags
    /// for this user).
    pub async fn create_task(&self, principal: Uuid, data: CreateTask) -> Result<Task> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let title = data.title.trim();
        if title.is_empty() {
            return Err(Error::validation("title", "title is required"));
        }

        if let Some(project_id) = data.project_id {
            state.check_project_ref(principal, project_id)?;
        }

        let tag_ids = state.resolve_or_create_tags(principal, &data.tags, now)?;

        let task = Task {
            id: Uuid::new_v4(),
            user_id: principal,
            project_id: data.project_id,
            title: title.to_string(),
            description: data.description,
            due_date: data.due_date,
            priority: data.priority.unwrap_or_default(),
            completed: false,
            tag_ids,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        state.tasks.insert(task.id, task.clone());
        tracing::debug!(user_id = %principal, task_id = %task.id, "created task");
        Ok(task)
    }

    /// Gets one of the principal's tasks
    pub async fn get_task(&self, principal: Uuid, id: Uuid) -> Result<Task> {
        let state = self.inner.read().await;
        state
            .tasks
            .get(&id)
            .filter(|t| t.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("task"))
    }

    /// Lists all of the principal's tasks, unordered
    ///
    /// Ordering and filtering belong to the query engine.
    pub async fn list_tasks(&self, principal: Uuid) -> Result<Vec<Task>> {
        let state = self.inner.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.user_id == principal)
            .cloned()
            .collect())
    }

    /// Applies a partial update to one of the principal's tasks
    pub async fn update_task(&self, principal: Uuid, id: Uuid, data: UpdateTask) -> Result<Task> {
        let now = self.clock.now();
        let mut state = self.inner.write().await;

        let current = state
            .tasks
            .get(&id)
            .filter(|t| t.user_id == principal)
            .cloned()
            .ok_or(Error::NotFound("task"))?;

        State::check_version(current.version, data.expected_version)?;

        // Validate references before touching the task, so a failed update
        // leaves it untouched.
        if let Some(Some(project_id)) = data.project_id {
            state.check_project_ref(principal, project_id)?;
        }
        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                return Err(Error::validation("title", "title is required"));
            }
        }

        let tag_ids = match &data.tags {
            Some(names) => Some(state.resolve_or_create_tags(principal, names, now)?),
            None => None,
        };

        let task = state.tasks.get_mut(&id).ok_or(Error::NotFound("task"))?;

        if let Some(title) = data.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(project_id) = data.project_id {
            task.project_id = project_id;
        }
        if let Some(due_date) = data.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(completed) = data.completed {
            task.completed = completed;
        }
        if let Some(tag_ids) = tag_ids {
            task.tag_ids = tag_ids;
        }

        task.updated_at = now;
        task.version += 1;

        tracing::debug!(user_id = %principal, task_id = %id, "updated task");
        Ok(task.clone())
    }

    /// Deletes one of the principal's tasks
    pub async fn delete_task(&self, principal: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.inner.write().await;

        let owned = state
            .tasks
            .get(&id)
            .map(|t| t.user_id == principal)
            .unwrap_or(false);
        if !owned {
            return Err(Error::NotFound("task"));
        }
        state.tasks.remove(&id);

        tracing::debug!(user_id = %principal, task_id = %id, "deleted task");
        Ok(())
    }
}
