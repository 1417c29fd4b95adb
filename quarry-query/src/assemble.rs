//! Result assembly: storing accepted values under multiplicity rules

use crate::coerce::coerce;
use quarry_core::{OptionSpec, OptionValue, Schema, SearchResult, StoredValue};
use std::collections::btree_map::Entry;

/// Store an accepted value. Multi-valued options append in input order;
/// singleton options are set, replacing any earlier value.
pub fn store(result: &mut SearchResult, spec: &OptionSpec, value: OptionValue) {
    if !spec.multiple {
        result
            .options
            .insert(spec.name.clone(), StoredValue::Single(value));
        return;
    }

    match result.options.entry(spec.name.clone()) {
        Entry::Occupied(mut entry) => {
            let slot = entry.get_mut();
            if let StoredValue::Single(first) = &*slot {
                let first = first.clone();
                *slot = StoredValue::Multi(vec![first]);
            }
            if let StoredValue::Multi(values) = slot {
                values.push(value);
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(StoredValue::Multi(vec![value]));
        }
    }
}

/// Append a decoded free-text term. Empty terms carry nothing and are dropped.
pub fn push_free_text(result: &mut SearchResult, term: String) {
    if !term.is_empty() {
        result.free_text.push(term);
    }
}

/// Fill options the input left unset from their schema defaults.
///
/// Defaults that do not coerce under their option's type are skipped; the
/// schema config loader refuses them up front.
pub fn apply_defaults(result: &mut SearchResult, schema: &Schema) {
    for spec in schema {
        if result.contains(&spec.name) {
            continue;
        }
        let Some(default) = spec.default.as_deref() else {
            continue;
        };
        match coerce(default, spec) {
            Some(value) => store(result, spec, value),
            None => tracing::warn!(
                option = %spec.name,
                default,
                "Ignoring default that does not match the option type"
            ),
        }
    }
}
