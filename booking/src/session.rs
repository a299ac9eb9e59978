//! Session registry for embedding hosts.
//!
//! A host page may run several widgets at once. [`SessionManager`] creates
//! them, tracks which are alive, and tears them all down on request. Each
//! [`SessionHandle`] deregisters itself when dropped.
//!
//! State that one widget hands to the next (for example a landing widget
//! that picks the vertical and some tickets before the full widget opens)
//! travels as an explicit [`SessionSeed`].

use crate::adapter::AdapterFactory;
use crate::api::{BookingBackend, UniversalApiService};
use crate::config::WidgetConfig;
use crate::engine::BookingEngine;
use crate::error::BookingError;
use crate::reducer::BookingEnvironment;
use crate::types::{SelectionPatch, Selections};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use universal_booking_core::environment::{Clock, SystemClock};
use uuid::Uuid;

/// Identifier of a live session
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data carried from one session into the next
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSeed {
    /// Business type the new session should use
    pub business_type: Option<String>,
    /// Line items to preselect
    #[serde(default)]
    pub selections: Selections,
}

/// Summary of a live session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session id
    pub id: SessionId,
    /// Business type at creation
    pub business_type: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

struct SessionEntry {
    engine: BookingEngine,
    info: SessionInfo,
}

type Registry = Arc<Mutex<BTreeMap<SessionId, SessionEntry>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, BTreeMap<SessionId, SessionEntry>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates and tracks booking sessions
#[derive(Clone)]
pub struct SessionManager {
    factory: Arc<AdapterFactory>,
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    sessions: Registry,
}

impl SessionManager {
    /// Manager creating sessions against `backend`
    #[must_use]
    pub fn new(factory: Arc<AdapterFactory>, backend: Arc<dyn BookingBackend>) -> Self {
        Self::with_clock(factory, backend, Arc::new(SystemClock))
    }

    /// Manager with an explicit clock
    #[must_use]
    pub fn with_clock(
        factory: Arc<AdapterFactory>,
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            factory,
            backend,
            clock,
            sessions: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Manager with the built-in adapters and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::HttpClient`] if the HTTP client cannot be built.
    pub fn with_http_backend(config: &WidgetConfig) -> Result<Self, BookingError> {
        Ok(Self::new(
            Arc::new(AdapterFactory::with_builtin()),
            Arc::new(UniversalApiService::new(config)?),
        ))
    }

    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns the engine's construction error (invalid configuration,
    /// unsupported business type).
    pub async fn init(&self, config: WidgetConfig) -> Result<SessionHandle, BookingError> {
        self.init_with_seed(config, SessionSeed::default()).await
    }

    /// Create a session continuing from `seed`.
    ///
    /// The seed's business type overrides the configuration's; its
    /// selections are preselected. `autoShow` opens the widget.
    ///
    /// # Errors
    ///
    /// See [`SessionManager::init`].
    pub async fn init_with_seed(
        &self,
        mut config: WidgetConfig,
        seed: SessionSeed,
    ) -> Result<SessionHandle, BookingError> {
        if let Some(business_type) = seed.business_type {
            config.business_type = business_type;
        }
        let auto_show = config.auto_show;

        let engine = BookingEngine::with_environment(
            config,
            Arc::clone(&self.factory),
            BookingEnvironment::new(Arc::clone(&self.backend), Arc::clone(&self.clock)),
        )?;

        if !seed.selections.is_empty() {
            let patch: SelectionPatch = seed
                .selections
                .iter()
                .map(|selection| (selection.id.clone(), selection.clone()))
                .collect();
            engine.update_selections(patch).await?;
        }
        if auto_show {
            engine.open().await?;
        }

        let id = SessionId::new();
        let info = SessionInfo {
            id,
            business_type: engine.adapter().await.business_type().to_string(),
            created_at: self.clock.now(),
        };
        tracing::info!(session = %id, business_type = %info.business_type, "Session registered");

        lock(&self.sessions).insert(
            id,
            SessionEntry {
                engine: engine.clone(),
                info,
            },
        );

        Ok(SessionHandle {
            id,
            engine,
            sessions: Arc::clone(&self.sessions),
        })
    }

    /// Shut down and forget every session; returns how many were destroyed
    pub async fn destroy_all(&self) -> usize {
        let entries: Vec<SessionEntry> = {
            let mut sessions = lock(&self.sessions);
            std::mem::take(&mut *sessions).into_values().collect()
        };

        let results = futures::future::join_all(entries.iter().map(|entry| entry.engine.shutdown())).await;
        for (entry, result) in entries.iter().zip(results) {
            if let Err(error) = result {
                tracing::warn!(session = %entry.info.id, %error, "Session did not shut down cleanly");
            }
        }

        tracing::info!(count = entries.len(), "Destroyed all sessions");
        entries.len()
    }

    /// Live sessions, oldest first
    #[must_use]
    pub fn instances(&self) -> Vec<SessionInfo> {
        let mut instances: Vec<SessionInfo> = lock(&self.sessions)
            .values()
            .map(|entry| entry.info.clone())
            .collect();
        instances.sort_by_key(|info| info.created_at);
        instances
    }

    /// Engine of a live session
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<BookingEngine> {
        lock(&self.sessions).get(&id).map(|entry| entry.engine.clone())
    }

    /// Current configuration of a live session
    pub async fn config(&self, id: SessionId) -> Option<WidgetConfig> {
        let engine = self.get(id)?;
        Some(engine.config().await)
    }

    /// Business types sessions can be created for
    #[must_use]
    pub fn supported_business_types(&self) -> Vec<String> {
        self.factory.supported_business_types()
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("factory", &self.factory)
            .field("sessions", &lock(&self.sessions).len())
            .finish_non_exhaustive()
    }
}

/// A live session; dropping it deregisters the session
pub struct SessionHandle {
    id: SessionId,
    engine: BookingEngine,
    sessions: Registry,
}

impl SessionHandle {
    /// Session id
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Seed for a follow-up session carrying this session's selections
    pub async fn seed_for(&self, business_type: &str) -> SessionSeed {
        SessionSeed {
            business_type: Some(business_type.to_string()),
            selections: self.engine.snapshot().await.selections,
        }
    }

    /// Shut the session down and deregister it.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if in-flight requests outlive the
    /// shutdown timeout. The session is deregistered either way.
    pub async fn close(self) -> Result<(), BookingError> {
        self.engine.shutdown().await
    }
}

impl Deref for SessionHandle {
    type Target = BookingEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if lock(&self.sessions).remove(&self.id).is_some() {
            tracing::debug!(session = %self.id, "Session deregistered");
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish_non_exhaustive()
    }
}
