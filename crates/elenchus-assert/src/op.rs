//! Helpers shared by the wrapper types.

use std::cell::Cell;
use std::rc::Rc;

use elenchus_core::{Chain, Severity};
use serde_json::Value as Json;

use crate::value::Value;

/// Runs `body` on a child chain named `segment`, unless the child is skipped.
pub(crate) fn check(parent: &Chain, segment: impl Into<String>, body: impl FnOnce(&Chain)) {
    let op = parent.enter(segment);
    if !op.is_skipped() {
        body(&op);
    }
    op.leave();
}

/// Builds a derived wrapper inside a child chain named `segment`.
///
/// `build` receives the child and should hand `op.fork()` to the wrapper it
/// returns; it must not record anything when the child is skipped.
pub(crate) fn derive<W>(
    parent: &Chain,
    segment: impl Into<String>,
    build: impl FnOnce(&Chain) -> W,
) -> W {
    let op = parent.enter(segment);
    let wrapper = build(&op);
    op.leave();
    wrapper
}

/// Evaluates `predicate` in isolation.
///
/// Failures inside the predicate are logged, not reported, and do not reach
/// `parent`. Returns `true` if the predicate returned `true` without any
/// check inside it failing.
pub(crate) fn probe(
    parent: &Chain,
    segment: impl Into<String>,
    value: Json,
    predicate: impl FnOnce(&Value) -> bool,
) -> bool {
    let failed = Rc::new(Cell::new(false));

    let chain = parent.enter(segment);
    chain.set_root();
    chain.set_severity(Severity::Log);
    let flag = Rc::clone(&failed);
    chain.set_fail_callback(move || flag.set(true));

    let matched = predicate(&Value::from_parts(chain.clone(), value));
    chain.leave();

    matched && !failed.get()
}

/// Returns a short name for the JSON type of `value`.
pub(crate) const fn kind_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Returns `true` if every key of `inner` is present in `outer` with a value
/// that is itself a subset. Non-objects must be equal.
pub(crate) fn contains_subset(outer: &Json, inner: &Json) -> bool {
    if outer == inner {
        return true;
    }
    match (outer, inner) {
        (Json::Object(outer), Json::Object(inner)) => inner.iter().all(|(key, value)| {
            outer
                .get(key)
                .is_some_and(|candidate| contains_subset(candidate, value))
        }),
        _ => false,
    }
}
