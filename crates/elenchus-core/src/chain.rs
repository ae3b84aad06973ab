//! Chain tracking.
//!
//! A [`Chain`] is one node in the tree of nested assertion contexts. Every
//! wrapper method [`enter`](Chain::enter)s a child node, checks its value,
//! records a [`fail`](Chain::fail)ure if the check does not hold, and
//! [`leave`](Chain::leave)s the child again. Leaving hands the outcome to the
//! [`AssertionHandler`] and marks the parent as having failed children.
//!
//! # Lifecycle
//!
//! ```text
//!  Chain::new ──► root (open, never left)
//!                   │ enter("Value()")
//!                   ▼
//!                 child (open) ── fail() ──► failed = true
//!                   │ leave()
//!                   ▼
//!                 child (closed) ──► handler.failure(ctx, record)
//!                                    parent.failed_children = true
//! ```
//!
//! Nodes are single-threaded and hold no locks. A child keeps its parent
//! alive; a parent only keeps weak references to its open children, which
//! it uses to reject out-of-order `leave()` calls.
//!
//! Wrappers returned to the caller hold a [`fork`](Chain::fork) of their
//! operation node. Forks and roots never leave, so failures below them are
//! forwarded up immediately until an open entered node or a
//! [`set_root`](Chain::set_root) boundary is reached.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::{render_path, AssertionContext, RequestSnapshot, ResponseSnapshot};
use crate::environment::Environment;
use crate::error::{fatal, UsageError};
use crate::failure::{AssertionFailure, Severity};
use crate::handler::AssertionHandler;

type FailCallback = Rc<dyn Fn()>;

/// Settings for a root chain.
///
/// Built once per test entity and read-only afterwards.
#[derive(Clone)]
pub struct ChainConfig {
    /// Name of the test, shown in reports.
    pub test_name: String,
    /// Severity of failures recorded on the root and inherited by children.
    pub severity: Severity,
    /// Where finished checks are reported.
    pub handler: Rc<dyn AssertionHandler>,
    /// Environment attached to the root.
    pub environment: Option<Environment>,
}

impl ChainConfig {
    /// Creates a configuration reporting to `handler`.
    #[must_use]
    pub fn new(handler: Rc<dyn AssertionHandler>) -> Self {
        Self {
            test_name: String::new(),
            severity: Severity::Error,
            handler,
            environment: None,
        }
    }

    /// Sets the test name.
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = name.into();
        self
    }

    /// Sets the root severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attaches an environment to the root.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("test_name", &self.test_name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    /// Created by `enter()`; only such nodes may leave.
    entered: bool,
    closed: bool,
    root: bool,
    failed: bool,
    failed_children: bool,
    /// Entered below a node that had already failed.
    skipped: bool,
}

struct Node {
    parent: Option<Rc<RefCell<Node>>>,
    open_children: Vec<Weak<RefCell<Node>>>,
    test_name: String,
    path: Vec<String>,
    aliased_path: Vec<String>,
    alias_set: bool,
    severity: Severity,
    handler: Rc<dyn AssertionHandler>,
    fail_callback: Option<FailCallback>,
    own_callback: bool,
    environment: Option<Environment>,
    request: Option<Rc<RequestSnapshot>>,
    response: Option<Rc<ResponseSnapshot>>,
    failure: Option<AssertionFailure>,
    flags: Flags,
}

impl Node {
    fn path_string(&self) -> String {
        render_path(&self.path)
    }

    #[track_caller]
    fn ensure_open(&self, operation: &'static str) {
        if self.flags.closed {
            fatal(UsageError::ChainClosed {
                operation,
                path: self.path_string(),
            });
        }
    }

    fn context(&self) -> AssertionContext {
        AssertionContext {
            test_name: self.test_name.clone(),
            path: self.path.clone(),
            aliased_path: self.aliased_path.clone(),
            request: self.request.clone(),
            response: self.response.clone(),
            environment: self.environment.clone(),
        }
    }

    /// Copies everything a descendant or fork inherits.
    fn derive(&self, parent: Option<Rc<RefCell<Node>>>, flags: Flags) -> Self {
        Self {
            parent,
            open_children: Vec::new(),
            test_name: self.test_name.clone(),
            path: self.path.clone(),
            aliased_path: self.aliased_path.clone(),
            alias_set: false,
            severity: self.severity,
            handler: Rc::clone(&self.handler),
            fail_callback: self.fail_callback.clone(),
            own_callback: false,
            environment: self.environment.clone(),
            request: self.request.clone(),
            response: self.response.clone(),
            failure: None,
            flags,
        }
    }
}

/// Marks `start` and the ancestors that will not leave again as having
/// failed children.
///
/// The walk stops at the first open entered node, which forwards the flag
/// itself when it leaves, and at propagation roots.
fn propagate_failure(start: Rc<RefCell<Node>>) {
    let mut current = Some(start);
    while let Some(node) = current {
        let mut node = node.borrow_mut();
        node.flags.failed_children = true;
        if node.flags.root || (node.flags.entered && !node.flags.closed) {
            break;
        }
        current = node.parent.clone();
    }
}

enum Outcome {
    Success,
    Failure(AssertionFailure),
    Silent,
}

/// A node in the assertion context tree.
///
/// `Clone` yields another handle to the same node. Use [`Chain::fork`] for an
/// independent copy.
///
/// # Example
///
/// ```
/// use elenchus_core::fixtures::recording_chain;
/// use elenchus_core::AssertionFailure;
///
/// let (root, handler) = recording_chain();
///
/// let op = root.enter("Foo");
/// op.fail(AssertionFailure::usage("something went wrong"));
/// op.leave();
///
/// assert!(!root.failed());
/// assert!(root.tree_failed());
/// assert_eq!(handler.failure_paths(), vec!["Foo".to_string()]);
/// ```
#[derive(Clone)]
pub struct Chain {
    node: Rc<RefCell<Node>>,
}

impl Chain {
    /// Creates a root chain.
    #[must_use]
    pub fn new(config: ChainConfig) -> Self {
        let node = Node {
            parent: None,
            open_children: Vec::new(),
            test_name: config.test_name,
            path: Vec::new(),
            aliased_path: Vec::new(),
            alias_set: false,
            severity: config.severity,
            handler: config.handler,
            fail_callback: None,
            own_callback: false,
            environment: config.environment,
            request: None,
            response: None,
            failure: None,
            flags: Flags::default(),
        };
        Self {
            node: Rc::new(RefCell::new(node)),
        }
    }

    /// Returns an independent copy of this node.
    ///
    /// The copy keeps the path, alias, severity, callback, attachments and
    /// current failure state. Its own failures never touch this node; they
    /// propagate to this node's parent instead, as a sibling's would. The copy
    /// cannot [`leave`](Chain::leave).
    #[must_use]
    pub fn fork(&self) -> Self {
        let node = self.node.borrow();
        node.ensure_open("fork");

        let mut copy = node.derive(
            node.parent.clone(),
            Flags {
                root: node.flags.root,
                failed: node.flags.failed,
                failed_children: node.flags.failed_children,
                skipped: node.flags.skipped,
                ..Flags::default()
            },
        );
        copy.alias_set = node.alias_set;
        copy.failure = node.failure.clone();

        Self {
            node: Rc::new(RefCell::new(copy)),
        }
    }

    /// Creates a child node whose path is extended by `segment`.
    ///
    /// The child must be [`leave`](Chain::leave)n before this node leaves.
    #[must_use]
    pub fn enter(&self, segment: impl Into<String>) -> Self {
        let segment = segment.into();

        let child = {
            let parent = self.node.borrow();
            parent.ensure_open("enter");
            if segment.is_empty() && parent.path.is_empty() {
                fatal(UsageError::EmptySegment);
            }

            let mut child = parent.derive(
                Some(Rc::clone(&self.node)),
                Flags {
                    entered: true,
                    skipped: parent.flags.skipped || parent.flags.failed,
                    ..Flags::default()
                },
            );
            child.path.push(segment.clone());
            child.aliased_path.push(segment);
            Rc::new(RefCell::new(child))
        };

        self.node
            .borrow_mut()
            .open_children
            .push(Rc::downgrade(&child));

        Self { node: child }
    }

    /// Overwrites the last path segment of this node.
    ///
    /// The aliased path is updated too unless an alias was set on this node.
    pub fn replace(&self, segment: impl Into<String>) {
        let segment = segment.into();
        let mut node = self.node.borrow_mut();
        node.ensure_open("replace");

        let alias_set = node.alias_set;
        if node.path.is_empty() || (!alias_set && node.aliased_path.is_empty()) {
            fatal(UsageError::EmptyPath);
        }

        if !alias_set {
            if let Some(last) = node.aliased_path.last_mut() {
                last.clone_from(&segment);
            }
        }
        if let Some(last) = node.path.last_mut() {
            *last = segment;
        }
    }

    /// Closes this node and reports its outcome.
    ///
    /// The handler receives this node's own failure, or a success if nothing
    /// in the subtree failed. A failed subtree marks the parent's
    /// `failed_children` unless this node is a propagation root.
    pub fn leave(&self) {
        let parent = {
            let node = self.node.borrow();
            node.ensure_open("leave");
            if !node.flags.entered {
                fatal(UsageError::NotEntered {
                    path: node.path_string(),
                });
            }

            let open = node
                .open_children
                .iter()
                .filter(|child| child.strong_count() > 0)
                .count();
            if open > 0 {
                fatal(UsageError::OpenChildren {
                    path: node.path_string(),
                    open,
                });
            }

            match &node.parent {
                Some(parent) => Rc::clone(parent),
                None => fatal(UsageError::NotEntered {
                    path: node.path_string(),
                }),
            }
        };

        {
            let mut parent = parent.borrow_mut();
            parent.open_children.retain(|child| child.strong_count() > 0);
            let innermost = parent
                .open_children
                .last()
                .is_some_and(|last| std::ptr::eq(last.as_ptr(), Rc::as_ptr(&self.node)));
            if !innermost {
                drop(parent);
                fatal(UsageError::OutOfOrder {
                    path: self.path_string(),
                });
            }
            parent.open_children.pop();
        }

        let (outcome, ctx, handler, propagate) = {
            let mut node = self.node.borrow_mut();
            node.flags.closed = true;

            let tree_failed = node.flags.failed || node.flags.failed_children;
            let outcome = match &node.failure {
                Some(failure) => Outcome::Failure(failure.clone()),
                None if !tree_failed && !node.flags.skipped => Outcome::Success,
                None => Outcome::Silent,
            };

            (
                outcome,
                node.context(),
                Rc::clone(&node.handler),
                tree_failed && !node.flags.root,
            )
        };

        if propagate {
            propagate_failure(parent);
        }

        match outcome {
            Outcome::Success => handler.success(&ctx),
            Outcome::Failure(failure) => handler.failure(&ctx, &failure),
            Outcome::Silent => {}
        }
    }

    /// Records a failed check on this node.
    ///
    /// Only the first failure is kept. The fail callback, if any, runs before
    /// this returns. On a node that will never leave (a root or a fork) the
    /// failure is reported immediately; otherwise it is reported on
    /// [`leave`](Chain::leave).
    pub fn fail(&self, mut failure: AssertionFailure) {
        let (callback, immediate, propagate) = {
            let mut node = self.node.borrow_mut();
            node.ensure_open("fail");
            if let Err(err) = failure.validate() {
                fatal(err);
            }

            if node.flags.failed {
                tracing::trace!(path = %node.path_string(), "chain already failed");
                return;
            }

            if failure.severity.is_none() {
                failure.severity = Some(node.severity);
            }
            tracing::trace!(
                path = %node.path_string(),
                kind = ?failure.kind,
                "failure recorded"
            );

            node.flags.failed = true;
            let (immediate, propagate) = if node.flags.entered {
                node.failure = Some(failure);
                (None, None)
            } else {
                node.failure = Some(failure.clone());
                let propagate = node.parent.clone().filter(|_| !node.flags.root);
                (
                    Some((Rc::clone(&node.handler), node.context(), failure)),
                    propagate,
                )
            };

            (node.fail_callback.clone(), immediate, propagate)
        };

        if let Some(parent) = propagate {
            propagate_failure(parent);
        }

        if let Some(callback) = callback {
            callback();
        }
        if let Some((handler, ctx, failure)) = immediate {
            handler.failure(&ctx, &failure);
        }
    }

    /// Returns `true` if this node itself recorded a failure.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.node.borrow().flags.failed
    }

    /// Returns `true` if this node or any node below it failed.
    #[must_use]
    pub fn tree_failed(&self) -> bool {
        let node = self.node.borrow();
        node.flags.failed || node.flags.failed_children
    }

    /// Returns `true` if this node was entered below a failed node.
    ///
    /// Wrapper methods return inert results on skipped chains instead of
    /// reporting follow-up failures.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.node.borrow().flags.skipped
    }

    /// Returns `true` if this node stops failure propagation.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.borrow().flags.root
    }

    /// Returns `true` once this node has left.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.node.borrow().flags.closed
    }

    /// Stops failures below this node from reaching its parent.
    pub fn set_root(&self) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_root");
        node.flags.root = true;
    }

    /// Changes the severity of future failures on this node and new children.
    pub fn set_severity(&self, severity: Severity) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_severity");
        node.severity = severity;
    }

    /// Installs a callback run whenever this node, or a node created below it
    /// afterwards, records its first failure.
    pub fn set_fail_callback(&self, callback: impl Fn() + 'static) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_fail_callback");
        if node.own_callback {
            let path = node.path_string();
            drop(node);
            fatal(UsageError::CallbackAlreadySet { path });
        }
        node.fail_callback = Some(Rc::new(callback));
        node.own_callback = true;
    }

    /// Sets the display name of this node.
    ///
    /// An empty name clears the aliased path entirely.
    pub fn set_alias(&self, name: impl Into<String>) {
        let name = name.into();
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_alias");
        node.aliased_path = if name.is_empty() {
            Vec::new()
        } else {
            vec![name]
        };
        node.alias_set = true;
    }

    /// Attaches an environment.
    pub fn set_environment(&self, environment: Environment) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_environment");
        if node.environment.is_some() {
            fatal(UsageError::AlreadyAttached {
                what: "environment",
                path: node.path_string(),
            });
        }
        node.environment = Some(environment);
    }

    /// Attaches the request being checked.
    pub fn set_request(&self, request: Rc<RequestSnapshot>) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_request");
        if node.request.is_some() {
            fatal(UsageError::AlreadyAttached {
                what: "request",
                path: node.path_string(),
            });
        }
        node.request = Some(request);
    }

    /// Attaches the response being checked.
    pub fn set_response(&self, response: Rc<ResponseSnapshot>) {
        let mut node = self.node.borrow_mut();
        node.ensure_open("set_response");
        if node.response.is_some() {
            fatal(UsageError::AlreadyAttached {
                what: "response",
                path: node.path_string(),
            });
        }
        node.response = Some(response);
    }

    /// Returns the path segments.
    #[must_use]
    pub fn path(&self) -> Vec<String> {
        self.node.borrow().path.clone()
    }

    /// Returns the aliased path segments.
    #[must_use]
    pub fn aliased_path(&self) -> Vec<String> {
        self.node.borrow().aliased_path.clone()
    }

    /// Returns the rendered path.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.node.borrow().path_string()
    }

    /// Returns the current severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.node.borrow().severity
    }

    /// Returns the first failure recorded on this node.
    #[must_use]
    pub fn failure(&self) -> Option<AssertionFailure> {
        self.node.borrow().failure.clone()
    }

    /// Returns the attached environment.
    #[must_use]
    pub fn environment(&self) -> Option<Environment> {
        self.node.borrow().environment.clone()
    }

    /// Returns the attached request.
    #[must_use]
    pub fn request(&self) -> Option<Rc<RequestSnapshot>> {
        self.node.borrow().request.clone()
    }

    /// Returns the attached response.
    #[must_use]
    pub fn response(&self) -> Option<Rc<ResponseSnapshot>> {
        self.node.borrow().response.clone()
    }

    /// Returns the context the handler would receive for this node.
    #[must_use]
    pub fn context(&self) -> AssertionContext {
        self.node.borrow().context()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("Chain")
            .field("path", &node.path_string())
            .field("severity", &node.severity)
            .field("flags", &node.flags)
            .finish_non_exhaustive()
    }
}
