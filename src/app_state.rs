//! Implements a struct that holds the state of the REST server.

use crate::backend::Backend;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<B>
where
    B: Backend,
{
    /// The store of people, accounts, bets and partners.
    pub backend: B,

    /// The local timezone as a canonical timezone name, e.g. "Europe/Rome".
    pub local_timezone: String,
}

impl<B> AppState<B>
where
    B: Backend,
{
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Rome".
    pub fn new(backend: B, local_timezone: &str) -> Self {
        Self {
            backend,
            local_timezone: local_timezone.to_owned(),
        }
    }
}
