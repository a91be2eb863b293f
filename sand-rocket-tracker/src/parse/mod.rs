//! Forgiving input parsing for tracker operations
//!
//! Accepts several JSON shapes and normalizes them to [`ParsedOperation`]s:
//!
//! - `{"op": "move task", "id": "..."}`
//! - `{"verb": "move", "noun": "task", ...}`
//! - `{"move": "task", ...}`
//! - an array of any of the above, run as a batch

use crate::error::{Result, TrackerError};
use crate::types::{Noun, ParsedOperation, UserId, Verb};
use serde_json::{Map, Value};

/// Parse input JSON into one or more operations
pub fn parse_input(input: Value) -> Result<Vec<ParsedOperation>> {
    match input {
        Value::Array(arr) => arr.into_iter().map(parse_single).collect(),
        Value::Object(obj) => Ok(vec![parse_single(Value::Object(obj))?]),
        _ => Err(TrackerError::parse("input must be an object or array")),
    }
}

fn parse_single(input: Value) -> Result<ParsedOperation> {
    let Value::Object(obj) = input else {
        return Err(TrackerError::parse("operation must be an object"));
    };

    let (verb, noun, mut params) = extract_operation(&obj)?;

    let actor = obj
        .get("actor")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
        .map(UserId::from_string);

    normalize_params(noun, &mut params);

    let mut operation = ParsedOperation::new(verb, noun, params);
    if let Some(actor) = actor {
        operation = operation.with_actor(actor);
    }
    Ok(operation)
}

fn extract_operation(obj: &Map<String, Value>) -> Result<(Verb, Noun, Map<String, Value>)> {
    // "op": "verb noun"
    if let Some(op) = obj
        .get("op")
        .or_else(|| obj.get("operation"))
        .and_then(Value::as_str)
    {
        return parse_op_string(op)
            .map(|(verb, noun)| (verb, noun, without_keys(obj, &["op", "operation"])))
            .ok_or_else(|| TrackerError::parse(format!("unknown operation '{}'", op)));
    }

    // Separate verb/noun fields
    if let (Some(verb), Some(noun)) = (
        obj.get("verb").and_then(Value::as_str),
        obj.get("noun").and_then(Value::as_str),
    ) {
        if let (Some(verb), Some(noun)) = (Verb::from_alias(verb), Noun::parse(noun)) {
            return Ok((verb, noun, without_keys(obj, &["verb", "noun"])));
        }
    }

    // Shorthand { "add": "task", ... }
    for (key, value) in obj {
        let noun = value.as_str().and_then(Noun::parse);
        if let (Some(verb), Some(noun)) = (Verb::from_alias(key), noun) {
            return Ok((verb, noun, without_keys(obj, &[key.as_str()])));
        }
    }

    Err(TrackerError::parse("cannot determine operation from input"))
}

/// Parse "verb noun"; "invite member" is shorthand for adding an invitation
fn parse_op_string(s: &str) -> Option<(Verb, Noun)> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    match parts.as_slice() {
        ["invite", _] | ["invite"] => Some((Verb::Add, Noun::Invitation)),
        [verb, noun] => Some((Verb::from_alias(verb)?, Noun::parse(noun)?)),
        _ => None,
    }
}

/// Copy of `obj` without the operation-selecting keys and metadata
fn without_keys(obj: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()) && !matches!(k.as_str(), "actor" | "note"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// snake_case every key, then resolve aliases
fn normalize_params(noun: Noun, params: &mut Map<String, Value>) {
    let keys: Vec<String> = params.keys().cloned().collect();
    for key in keys {
        let snake = to_snake_case(&key);
        if snake != key {
            if let Some(value) = params.remove(&key) {
                params.entry(snake).or_insert(value);
            }
        }
    }

    let own_id = match noun {
        Noun::Task => Some("task_id"),
        Noun::Epic => Some("epic_id"),
        Noun::Invitation => Some("invitation_id"),
        Noun::Attachment => Some("attachment_id"),
        _ => None,
    };

    // `task_id` names the task itself only for task operations; attachments
    // use it to point at their parent
    let mut aliases: Vec<(&str, &str)> = vec![
        ("desc", "description"),
        ("body", "description"),
        ("column", "status"),
        ("col", "status"),
    ];
    if let Some(own_id) = own_id {
        aliases.push((own_id, "id"));
    }

    for (from, to) in aliases {
        if let Some(value) = params.remove(from) {
            params.entry(to.to_string()).or_insert(value);
        }
    }
}

/// camelCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(c.to_lowercase());
    }
    result
}
