//! Closure-backed provider.

use super::{Candidate, Provider};
use std::fmt;
use std::marker::PhantomData;

/// Provides whatever a closure returns, evaluated on every resolve.
///
/// ```
/// use fieldwise::provider::{Candidate, Function, Provider};
///
/// let provider = Function::new("computed", || Ok(Candidate::new(vec![1u8])));
/// assert_eq!(provider.name(), "computed");
/// assert_eq!(provider.config().unwrap().value, vec![1u8]);
/// ```
pub struct Function<T, F> {
    name: String,
    func: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> Function<T, F>
where
    F: Fn() -> anyhow::Result<Candidate<T>>,
{
    /// An empty name falls back to `function`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                "function".to_string()
            } else {
                name
            },
            func,
            _marker: PhantomData,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T, F> fmt::Debug for Function<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

impl<T, F> Provider<T> for Function<T, F>
where
    F: Fn() -> anyhow::Result<Candidate<T>>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> anyhow::Result<Candidate<T>> {
        (self.func)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_falls_back() {
        let provider = Function::new("", || Ok(Candidate::new(1u8)));
        assert_eq!(provider.name(), "function");

        let provider = provider.with_name("renamed");
        assert_eq!(provider.name(), "renamed");
    }

    #[test]
    fn test_errors_pass_through() {
        let provider = Function::new("broken", || -> anyhow::Result<Candidate<u8>> {
            anyhow::bail!("backend unreachable")
        });
        let err = provider.config().unwrap_err();
        assert_eq!(err.to_string(), "backend unreachable");
    }
}
