use std::future::Future;

use crate::FetchRequest;

/// The capability that executes a [`FetchRequest`] against the data store.
///
/// This trait is storage-agnostic: a database driver, an HTTP client or a
/// plain closure can all act as the source of truth. Every async function or
/// closure taking a [`FetchRequest`] and returning a `Result` implements it.
///
/// # Examples
///
/// ```
/// use cachebox_core::{Fetch, FetchRequest};
///
/// let fetch = |request: FetchRequest| async move {
///     Ok::<_, std::io::Error>(vec![request.namespace().to_string()])
/// };
/// # let _ = fetch.fetch(FetchRequest::new("people"));
/// ```
pub trait Fetch: Send + Sync {
    /// The value produced by a successful fetch.
    type Output;

    /// The error produced by a failed fetch.
    type Error;

    /// The future that resolves to the fetch result.
    type Future: Future<Output = Result<Self::Output, Self::Error>> + Send;

    /// Execute the request against the data store.
    fn fetch(&self, request: FetchRequest) -> Self::Future;
}

impl<F, Fut, T, E> Fetch for F
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn fetch(&self, request: FetchRequest) -> Self::Future {
        (self)(request)
    }
}
