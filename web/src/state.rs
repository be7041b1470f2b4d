//! Shared application state.

use std::sync::Arc;
use studia_identity::{CacheStore, MailSender, UserRepository, UserService};

/// Dependency container handed to every handler.
///
/// Built once at startup; axum clones it per request, which is a pair
/// of `Arc` bumps.
#[derive(Debug)]
pub struct AppState<R, C, M> {
    /// Identity workflow service.
    pub service: Arc<UserService<R, C, M>>,
}

impl<R, C, M> AppState<R, C, M>
where
    R: UserRepository,
    C: CacheStore,
    M: MailSender,
{
    /// Wrap a service in shared state.
    pub fn new(service: UserService<R, C, M>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<R, C, M> Clone for AppState<R, C, M> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
