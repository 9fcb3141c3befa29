//! Never-crash boundary around model calls.
//!
//! Each success type declares its own fallback value once via `Fallback`.
//! Callers wrap a gateway future in `recover` instead of matching on errors,
//! so a failed call always yields a usable value and never reaches the UI.

use std::future::Future;

use serde::Serialize;
use tracing::warn;

use super::GatewayError;

/// Value substituted when the model call producing `Self` fails.
pub trait Fallback {
    fn fallback() -> Self;
}

/// Outcome of a recovered model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Generated<T> {
    /// The model answered.
    Fresh(T),
    /// The call failed and the declared fallback was substituted.
    Fallback(T),
}

impl<T> Generated<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Generated::Fresh(v) | Generated::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Generated::Fresh(v) | Generated::Fallback(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Generated<U> {
        match self {
            Generated::Fresh(v) => Generated::Fresh(f(v)),
            Generated::Fallback(v) => Generated::Fallback(f(v)),
        }
    }
}

/// Awaits `call`, substituting `T::fallback()` on any gateway error.
pub async fn recover<T, F>(operation: &'static str, call: F) -> Generated<T>
where
    T: Fallback,
    F: Future<Output = Result<T, GatewayError>>,
{
    match call.await {
        Ok(value) => Generated::Fresh(value),
        Err(e) => {
            warn!(operation, error = %e, "Model call failed, substituting fallback");
            Generated::Fallback(T::fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Answer(&'static str);

    impl Fallback for Answer {
        fn fallback() -> Self {
            Answer("sorry")
        }
    }

    #[tokio::test]
    async fn test_recover_passes_success_through() {
        let outcome = recover("answer", async { Ok(Answer("42")) }).await;
        assert_eq!(outcome, Generated::Fresh(Answer("42")));
        assert!(!outcome.is_fallback());
    }

    #[tokio::test]
    async fn test_recover_substitutes_fallback_on_error() {
        let outcome = recover("answer", async {
            Err::<Answer, _>(GatewayError::EmptyContent)
        })
        .await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_inner(), Answer("sorry"));
    }
}
