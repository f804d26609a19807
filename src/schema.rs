//!
//! The schema capability consumed by route pipelines.
//!
//! A [`Schema`] is anything that, given a JSON value, either returns the
//! parsed (possibly coerced or defaulted) value or a list of structured
//! [`Issue`]s. The pipeline never inspects schemas beyond calling
//! [`Schema::validate`], so any validation engine can be plugged in.
//!
//! Two adapters cover the common cases:
//!
//! - [`schema_fn`] wraps a plain closure.
//! - [`Typed`] parses into a serde type and re-serializes the result, with
//!   optional refinements added through [`Typed::check`].
//!

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    std::{fmt, marker::PhantomData, sync::Arc},
};

/// Outcome of a schema run: the parsed value or the issues found.
pub type Validation = Result<Value, Vec<Issue>>;

/// A structured validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Machine-readable issue code, e.g. `invalid_type` or `too_small`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Location of the offending value inside the validated slot.
    #[serde(default)]
    pub path: Vec<String>,
}

impl Issue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Sets the path of the issue.
    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} at {}: {}", self.code, self.path.join("."), self.message)
        }
    }
}

/// Validation capability for one request slot.
///
/// Implementations must be cheap to share: the pipeline holds them behind an
/// `Arc` and calls them concurrently from independent requests.
#[async_trait]
pub trait Schema: Send + Sync {
    /// Validates `value`, returning the parsed output or the issues found.
    async fn validate(&self, value: Value) -> Validation;
}

#[async_trait]
impl<S> Schema for Arc<S>
where
    S: Schema + ?Sized,
{
    async fn validate(&self, value: Value) -> Validation {
        (**self).validate(value).await
    }
}

/// Schema backed by a synchronous closure. Created with [`schema_fn`].
pub struct FnSchema<F> {
    f: F,
}

/// Wraps a closure as a [`Schema`].
///
/// ```rust
/// use axum_conduit::{Issue, schema_fn};
/// use serde_json::Value;
///
/// let id_is_numeric = schema_fn(|value: Value| {
///     match value.get("id").and_then(Value::as_str).map(str::parse::<u64>) {
///         Some(Ok(id)) => Ok(serde_json::json!({ "id": id })),
///         _ => Err(vec![Issue::new("invalid_type", "id must be numeric").at(["id"])]),
///     }
/// });
/// # let _ = id_is_numeric;
/// ```
pub fn schema_fn<F>(f: F) -> FnSchema<F>
where
    F: Fn(Value) -> Validation + Send + Sync,
{
    FnSchema { f }
}

#[async_trait]
impl<F> Schema for FnSchema<F>
where
    F: Fn(Value) -> Validation + Send + Sync,
{
    async fn validate(&self, value: Value) -> Validation {
        (self.f)(value)
    }
}

type Check<T> = Box<dyn Fn(&T) -> Vec<Issue> + Send + Sync>;

/// Schema that parses the slot into `T` with serde.
///
/// The value handed to the rest of the pipeline is `T` serialized back to
/// JSON, so serde defaults and renames behave as coercions.
///
/// ```rust
/// use axum_conduit::{Issue, Typed};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, Serialize)]
/// struct Signup {
///     email: String,
///     #[serde(default)]
///     newsletter: bool,
/// }
///
/// let schema = Typed::<Signup>::new().check(|signup| {
///     if signup.email.contains('@') {
///         vec![]
///     } else {
///         vec![Issue::new("invalid_string", "email must contain '@'").at(["email"])]
///     }
/// });
/// # let _ = schema;
/// ```
pub struct Typed<T> {
    checks: Vec<Check<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T>
where
    T: DeserializeOwned + Serialize,
{
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Adds a refinement run after a successful parse. Every check runs and
    /// their issues are concatenated.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> Vec<Issue> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }
}

impl<T> Default for Typed<T>
where
    T: DeserializeOwned + Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Schema for Typed<T>
where
    T: DeserializeOwned + Serialize,
{
    async fn validate(&self, value: Value) -> Validation {
        let parsed: T = serde_json::from_value(value)
            .map_err(|e| vec![Issue::new("invalid_type", e.to_string())])?;

        let issues: Vec<Issue> = self.checks.iter().flat_map(|check| check(&parsed)).collect();
        if !issues.is_empty() {
            return Err(issues);
        }

        serde_json::to_value(&parsed).map_err(|e| vec![Issue::new("custom", e.to_string())])
    }
}
