// Copyright (c) 2025 - Cowboy AI, Inc.

//! Handler discovery and validation
//!
//! The resolver walks a [`HandlerTree`] once at start-up and produces the
//! immutable mapping from [`Event`] to the handlers bound to it. Every unit is
//! checked against its event's schema so the generic "validate then call by
//! keyword" dispatch path can never fail on arity or type at run time.
//!
//! A unit that fails validation is logged, dropped and recorded in
//! [`Resolution::rejected`]; the rest of the tree still registers.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::events::{AutomatedEvent, Event, FieldType, ManualEvent, ParseError, Schema};
use crate::handler::{EntryPoint, Handler, Parameter, ParameterKind, ReturnType};
use crate::registry::{is_unit_name, Declaration, HandlerTree, Loader, Node, PACKAGE_ENTRY};
use crate::subjects::Kind;

/// Errors that exclude a single unit from the mapping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The declared event could not be parsed
    #[error(transparent)]
    InvalidEvent(#[from] ParseError),

    /// The unit declares an event but no handler
    #[error("missing entry point 'handler'")]
    MissingEntryPoint,

    /// A schema field has no matching parameter
    #[error("missing required argument {0:?}")]
    MissingArgument(String),

    /// A parameter is annotated with a type other than the schema's
    #[error("mismatch argument type for {name:?}: provided {provided}, function expected {expected}")]
    ArgumentTypeMismatch {
        name: String,
        provided: FieldType,
        expected: FieldType,
    },

    /// A parameter cannot be passed by keyword
    #[error("argument {0:?} must be able to be passed as a keyword argument")]
    NotKeyword(String),

    /// A parameter outside the schema has no default
    #[error("unused argument {0:?} must have default")]
    MissingDefault(String),

    /// The declared return type is not allowed for the event kind
    #[error("expected return type of {expected}, got {found}")]
    InvalidReturnType {
        expected: &'static str,
        found: ReturnType,
    },
}

/// A unit excluded from the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// `{service}.{unit}`
    pub unit: String,
    pub error: ResolveError,
}

/// Event to handlers mapping built at start-up
pub type HandlerMap = BTreeMap<Event, Vec<Handler>>;

/// Outcome of walking a handler tree
#[derive(Debug, Default)]
pub struct Resolution {
    pub handlers: HandlerMap,
    pub rejected: Vec<Rejected>,
}

impl Resolution {
    /// Total number of registered handlers across all events
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn get(&self, event: &Event) -> Option<&[Handler]> {
        self.handlers.get(event).map(Vec::as_slice)
    }
}

/// Resolve every handler unit under the tree
pub fn resolve(tree: &HandlerTree) -> Resolution {
    let mut resolution = Resolution::default();

    for node in tree.nodes() {
        let (service, children) = match node {
            Node::Directory { name, children } => (name, children),
            Node::Unit { name, .. } => {
                debug!(path = %name, "skipping path, must be a directory");
                continue;
            }
        };

        if service.starts_with('_') || !is_unit_name(service) {
            debug!(service = %service, "skipping service, invalid name");
            continue;
        }

        for child in children {
            let Some((unit, loader)) = handler_unit(service, child) else {
                continue;
            };

            let qualified = format!("{}.{}", service, unit);
            let module = format!("{}.{}", tree.root(), qualified);

            match load(service, unit, loader) {
                Ok(Some((event, handler))) => {
                    info!(
                        service = %service,
                        handler = %unit,
                        event = %event,
                        kind = %event.kind(),
                        "loaded handler"
                    );
                    resolution.handlers.entry(event).or_default().push(handler);
                }
                Ok(None) => {
                    debug!(service = %service, handler = %unit, "skipping handler, shared module");
                }
                Err(e) => {
                    error!(
                        service = %service,
                        handler = %unit,
                        module = %module,
                        error = %e,
                        "failed to load handler"
                    );
                    resolution.rejected.push(Rejected {
                        unit: qualified,
                        error: e,
                    });
                }
            }
        }
    }

    resolution
}

/// Pick the loadable unit a service entry stands for
fn handler_unit<'a>(service: &str, node: &'a Node) -> Option<(&'a str, &'a Loader)> {
    let name = node.name();
    if name.starts_with('_') {
        debug!(service = %service, handler = %name, "skipping handler, invalid name");
        return None;
    }
    if !is_unit_name(name) || name == PACKAGE_ENTRY {
        debug!(service = %service, handler = %name, "skipping handler, not a handler unit");
        return None;
    }

    match node {
        Node::Unit { name, loader } => Some((name.as_str(), loader)),
        Node::Directory { name, children } => {
            let entry = children.iter().find_map(|child| match child {
                Node::Unit { name, loader } if name == PACKAGE_ENTRY => Some(loader),
                _ => None,
            });
            if entry.is_none() {
                debug!(service = %service, package = %name, "skipping package, no entry point");
            }
            entry.map(|loader| (name.as_str(), loader))
        }
    }
}

/// Load one unit, producing its event and handler or `None` for shared code
fn load(
    service: &str,
    unit: &str,
    loader: &Loader,
) -> Result<Option<(Event, Handler)>, ResolveError> {
    let (declaration, entry) = loader().into_parts();

    let kind = match &declaration {
        Declaration::Shared => return Ok(None),
        Declaration::Automated(_) => Kind::Automated,
        Declaration::Manual => Kind::Manual,
    };
    let automated = match &declaration {
        Declaration::Automated(raw) => Some(AutomatedEvent::parse(raw)?),
        _ => None,
    };

    let entry = entry.ok_or(ResolveError::MissingEntryPoint)?;
    check_return_type(kind, entry.returns())?;

    let event = match automated {
        Some(event) => {
            check_parameters(&event.input_validator(), entry.parameters())?;
            Event::Automated(event)
        }
        None => {
            let schema = synthesize_schema(&format!("{}.{}", service, unit), entry.parameters())?;
            Event::Manual(ManualEvent::new(service, unit, schema))
        }
    };

    Ok(Some((event, handler(service, unit, &entry))))
}

fn handler(service: &str, unit: &str, entry: &EntryPoint) -> Handler {
    Handler::new(format!("{}.{}", service, unit), entry.callback())
}

fn check_return_type(kind: Kind, returns: ReturnType) -> Result<(), ResolveError> {
    match (kind, returns) {
        (_, ReturnType::Unannotated | ReturnType::Unit) => Ok(()),
        (Kind::Manual, ReturnType::Response) => Ok(()),
        (Kind::Automated, found) => Err(ResolveError::InvalidReturnType {
            expected: "()",
            found,
        }),
        (Kind::Manual, found) => Err(ResolveError::InvalidReturnType {
            expected: "() or Response",
            found,
        }),
    }
}

/// Check a handler's parameters against a declared schema
pub fn check_parameters(schema: &Schema, parameters: &[Parameter]) -> Result<(), ResolveError> {
    for field in schema.fields() {
        let param = parameters
            .iter()
            .find(|param| param.name == field.name)
            .ok_or_else(|| ResolveError::MissingArgument(field.name.clone()))?;

        if let Some(expected) = param.annotation {
            if expected != field.ty {
                return Err(ResolveError::ArgumentTypeMismatch {
                    name: field.name.clone(),
                    provided: field.ty,
                    expected,
                });
            }
        }
    }

    for param in parameters {
        if param.kind != ParameterKind::Keyword {
            return Err(ResolveError::NotKeyword(param.name.clone()));
        }
        if schema.get(&param.name).is_none() && !param.has_default {
            return Err(ResolveError::MissingDefault(param.name.clone()));
        }
    }

    Ok(())
}

/// Build the schema of a manual command from its handler's parameters
pub fn synthesize_schema(name: &str, parameters: &[Parameter]) -> Result<Schema, ResolveError> {
    let mut schema = Schema::new(name).forbid_extra();
    for param in parameters {
        if param.kind != ParameterKind::Keyword {
            return Err(ResolveError::NotKeyword(param.name.clone()));
        }
        let ty = param.annotation.unwrap_or(FieldType::Any);
        schema = if param.has_default {
            schema.optional_field(param.name.clone(), ty)
        } else {
            schema.field(param.name.clone(), ty)
        };
    }
    Ok(schema)
}
