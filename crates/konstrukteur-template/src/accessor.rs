/*
 * accessor.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Name resolution against a data context.
//!
//! Resolution never fails: a name that cannot be found is simply `None`.

use crate::ast::{Accessor, AccessorMode};
use crate::value::Value;
use std::borrow::Cow;

/// Resolve an accessor against `context`.
pub fn resolve<'a>(accessor: &Accessor, context: &'a Value) -> Option<&'a Value> {
    resolve_key(accessor.mode, &accessor.key, context)
}

/// Resolve `key` against `context` using `mode`.
pub fn resolve_key<'a>(mode: AccessorMode, key: &str, context: &'a Value) -> Option<&'a Value> {
    match mode {
        AccessorMode::ByKey => get_key(key, context),
        AccessorMode::ByPath => key
            .split('.')
            .try_fold(context, |current, segment| get_key(segment, current)),
        AccessorMode::BySelf => match context {
            Value::Null => None,
            _ => Some(context),
        },
    }
}

/// Whether the accessor resolves to a truthy value.
pub fn has(accessor: &Accessor, context: &Value) -> bool {
    resolve(accessor, context).is_some_and(Value::is_truthy)
}

fn get_key<'a>(key: &str, context: &'a Value) -> Option<&'a Value> {
    let Value::Map(entries) = context else {
        return None;
    };
    if let Some(value) = entries.get(key) {
        return Some(value);
    }
    match camelize(key) {
        Cow::Owned(camel) => entries.get(&camel),
        Cow::Borrowed(_) => None,
    }
}

/// Convert a dash or underscore separated key to camel case.
///
/// `published-date` and `published_date` both become `publishedDate`.
/// Keys without separators are returned unchanged.
pub fn camelize(key: &str) -> Cow<'_, str> {
    if !key.contains(['-', '_']) {
        return Cow::Borrowed(key);
    }

    let mut out = String::with_capacity(key.len());
    for (i, segment) in key.split(['-', '_']).enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    Cow::Owned(out)
}
