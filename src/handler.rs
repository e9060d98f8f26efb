// Copyright (c) 2025 - Cowboy AI, Inc.

//! Handler entry points and registry entries
//!
//! Handlers are ordinary async functions taking one input struct and
//! returning `anyhow::Result<R>`. The input struct is declared with
//! [`arguments!`](crate::arguments), which derives its parameter list from the
//! Rust field types, and the return type describes itself through
//! [`IntoReturned`], so the resolver can check a handler against its event
//! before any message is processed. Once checked, the function is erased into
//! a [`Callback`] invoked with the validated keyword arguments.
//!
//! ```rust
//! use hackathon_tasks::arguments;
//! use hackathon_tasks::events::FieldType;
//! use hackathon_tasks::handler::{Arguments, EntryPoint};
//!
//! arguments! {
//!     struct Accepted {
//!         participant_id: i64,
//!         #[default]
//!         notify: bool,
//!     }
//! }
//!
//! async fn on_accepted(args: Accepted) -> anyhow::Result<()> {
//!     tracing::info!(participant_id = args.participant_id, notify = args.notify, "accepted");
//!     Ok(())
//! }
//!
//! let params = Accepted::parameters();
//! assert_eq!(params[0].annotation, Some(FieldType::Integer));
//! assert!(params[1].has_default);
//!
//! let entry = EntryPoint::new(on_accepted);
//! assert_eq!(entry.parameters().len(), 2);
//! ```

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::events::{FieldType, Kwargs};
use crate::response::Response;

/// Future returned by an erased handler
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<Returned>>;

/// Type-erased handler function called with keyword arguments
pub type Callback = Arc<dyn Fn(Kwargs) -> HandlerFuture + Send + Sync>;

/// How a parameter can be passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Passed by name
    Keyword,
    /// Only passable by position
    PositionalOnly,
    /// Catch-all collecting remaining arguments
    Variadic,
}

/// One entry of a handler's parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Declared type, `None` when unannotated
    pub annotation: Option<FieldType>,
    pub has_default: bool,
    pub kind: ParameterKind,
}

impl Parameter {
    /// A required, unannotated keyword parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            has_default: false,
            kind: ParameterKind::Keyword,
        }
    }

    /// A required keyword parameter annotated from a Rust field type
    pub fn of<T: Annotation>(name: impl Into<String>) -> Self {
        Self {
            annotation: T::annotation(),
            ..Self::new(name)
        }
    }

    pub fn annotated(mut self, ty: FieldType) -> Self {
        self.annotation = Some(ty);
        self
    }

    /// Mark the parameter as defaulted (`#[serde(default)]` on the field)
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Rust types usable as handler input fields
pub trait Annotation {
    /// Schema type the field binds from, `None` for any JSON value
    fn annotation() -> Option<FieldType>;
}

macro_rules! annotate {
    ($ty:expr => $($rust:ty),+) => {
        $(
            impl Annotation for $rust {
                fn annotation() -> Option<FieldType> {
                    $ty
                }
            }
        )+
    };
}

annotate!(Some(FieldType::Integer) => i64, i32, u64, u32);
annotate!(Some(FieldType::Float) => f64, f32);
annotate!(Some(FieldType::String) => String);
annotate!(Some(FieldType::Boolean) => bool);
annotate!(Some(FieldType::DateTime) => DateTime<Utc>);
annotate!(None => Value);

#[doc(hidden)]
pub mod sealed {
    /// Implemented only by [`arguments!`](crate::arguments)
    pub trait Declared {}
}

/// Input struct of a handler
///
/// Implemented through [`arguments!`](crate::arguments) only, so the parameter
/// list always matches the fields the struct deserializes.
pub trait Arguments: sealed::Declared + DeserializeOwned + Send + 'static {
    fn parameters() -> Vec<Parameter>;
}

/// Declare a handler input struct together with its [`Arguments`] impl
///
/// Each field becomes a keyword parameter annotated from its Rust type. A
/// field marked `#[default]` is deserialized with `#[serde(default)]` and
/// reported as defaulted. Field types must implement [`Annotation`]. The
/// caller needs `serde` as a dependency.
///
/// [`Arguments`]: crate::handler::Arguments
/// [`Annotation`]: crate::handler::Annotation
#[macro_export]
macro_rules! arguments {
    (@parameter $field:ident : $ty:ty) => {
        $crate::handler::Parameter::of::<$ty>(stringify!($field))
    };
    (@parameter $field:ident : $ty:ty, default) => {
        $crate::handler::Parameter::of::<$ty>(stringify!($field)).with_default()
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$default:ident])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        #[derive(::serde::Deserialize)]
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[serde($default)])?
                $fvis $field: $ty,
            )*
        }

        impl $crate::handler::sealed::Declared for $name {}

        impl $crate::handler::Arguments for $name {
            fn parameters() -> ::std::vec::Vec<$crate::handler::Parameter> {
                ::std::vec![
                    $( $crate::arguments!(@parameter $field : $ty $(, $default)?) ),*
                ]
            }
        }
    };
}

crate::arguments! {
    /// Input of a handler that takes no arguments
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoArguments {}
}

/// Declared return type of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// Any JSON value, intent unknown
    Unannotated,
    /// Returns nothing
    Unit,
    /// Returns a [`Response`]
    Response,
    /// Anything else, rejected by the resolver
    Other(&'static str),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Unannotated => write!(f, "unannotated"),
            ReturnType::Unit => write!(f, "()"),
            ReturnType::Response => write!(f, "Response"),
            ReturnType::Other(name) => f.write_str(name),
        }
    }
}

/// What a handler produced at run time
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    Nothing,
    Response(Response),
    Value(Value),
}

/// Return types a handler may declare
pub trait IntoReturned: Send + 'static {
    fn return_type() -> ReturnType;

    fn into_returned(self) -> Returned;
}

impl IntoReturned for () {
    fn return_type() -> ReturnType {
        ReturnType::Unit
    }

    fn into_returned(self) -> Returned {
        Returned::Nothing
    }
}

impl IntoReturned for Response {
    fn return_type() -> ReturnType {
        ReturnType::Response
    }

    fn into_returned(self) -> Returned {
        Returned::Response(self)
    }
}

impl IntoReturned for Value {
    fn return_type() -> ReturnType {
        ReturnType::Unannotated
    }

    fn into_returned(self) -> Returned {
        Returned::Value(self)
    }
}

/// A handler function together with its signature
#[derive(Clone)]
pub struct EntryPoint {
    parameters: Vec<Parameter>,
    returns: ReturnType,
    callback: Callback,
}

impl EntryPoint {
    /// Erase an async handler function
    pub fn new<A, R, F, Fut>(handler: F) -> Self
    where
        A: Arguments,
        R: IntoReturned,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        let callback: Callback = Arc::new(move |kwargs: Kwargs| -> HandlerFuture {
            match serde_json::from_value::<A>(Value::Object(kwargs)) {
                Ok(args) => handler(args).map(|result| result.map(R::into_returned)).boxed(),
                Err(e) => future::ready(Err(
                    anyhow::Error::new(e).context("failed to bind keyword arguments")
                ))
                .boxed(),
            }
        });

        Self {
            parameters: A::parameters(),
            returns: R::return_type(),
            callback,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn returns(&self) -> ReturnType {
        self.returns
    }

    pub fn callback(&self) -> Callback {
        Arc::clone(&self.callback)
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// A registered handler: a name for logs and traces plus its callback
#[derive(Clone)]
pub struct Handler {
    name: String,
    callback: Callback,
}

impl Handler {
    pub fn new(name: impl Into<String>, callback: Callback) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }

    /// `{directory}.{unit}`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, kwargs: Kwargs) -> HandlerFuture {
        (self.callback)(kwargs)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    crate::arguments! {
        struct SendMessage {
            message_id: i64,
            #[default]
            dry_run: bool,
        }
    }

    async fn send(args: SendMessage) -> anyhow::Result<Response> {
        if args.dry_run {
            return Ok(Response::success());
        }
        Ok(Response::failure(format!("no such message {}", args.message_id)))
    }

    fn kwargs(value: Value) -> Kwargs {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    crate::arguments! {
        #[derive(Debug)]
        struct Everything {
            count: u32,
            score: f64,
            label: String,
            #[default]
            flag: bool,
            at: DateTime<Utc>,
            extra: Value,
        }
    }

    #[test]
    fn test_parameters_follow_field_types() {
        let params: Vec<_> = Everything::parameters()
            .into_iter()
            .map(|p| (p.name, p.annotation, p.has_default))
            .collect();
        assert_eq!(
            params,
            vec![
                ("count".to_string(), Some(FieldType::Integer), false),
                ("score".to_string(), Some(FieldType::Float), false),
                ("label".to_string(), Some(FieldType::String), false),
                ("flag".to_string(), Some(FieldType::Boolean), true),
                ("at".to_string(), Some(FieldType::DateTime), false),
                ("extra".to_string(), None, false),
            ]
        );
    }

    #[test]
    fn test_defaulted_field_binds_when_omitted() {
        let args: Everything = serde_json::from_value(json!({
            "count": 1,
            "score": 0.5,
            "label": "x",
            "at": "2025-01-01T00:00:00Z",
            "extra": null,
        }))
        .unwrap();
        assert!(!args.flag);
        assert_eq!((args.count, args.label.as_str()), (1, "x"));
        assert!(args.score > 0.0 && args.extra.is_null());
        assert_eq!(args.at.timestamp(), 1_735_689_600);
    }

    #[test]
    fn test_signature_is_captured() {
        let entry = EntryPoint::new(send);
        assert_eq!(entry.returns(), ReturnType::Response);
        assert_eq!(entry.parameters()[0].name, "message_id");
        assert!(entry.parameters()[1].has_default);
    }

    #[tokio::test]
    async fn test_callback_uses_defaults_for_omitted_parameters() {
        let handler = Handler::new("communication.send", EntryPoint::new(send).callback());
        let returned = handler.call(kwargs(json!({"message_id": 7}))).await.unwrap();
        assert_eq!(
            returned,
            Returned::Response(Response::failure("no such message 7"))
        );
    }

    #[tokio::test]
    async fn test_callback_reports_binding_errors() {
        let handler = Handler::new("communication.send", EntryPoint::new(send).callback());
        let err = handler.call(kwargs(json!({}))).await.unwrap_err();
        assert!(err.to_string().contains("bind keyword arguments"));
    }

    #[tokio::test]
    async fn test_no_arguments_handler() {
        async fn ping(_: NoArguments) -> anyhow::Result<()> {
            Ok(())
        }

        let entry = EntryPoint::new(ping);
        assert!(entry.parameters().is_empty());
        assert_eq!(entry.returns(), ReturnType::Unit);
        let returned = (entry.callback())(Kwargs::new()).await.unwrap();
        assert_eq!(returned, Returned::Nothing);
    }
}
