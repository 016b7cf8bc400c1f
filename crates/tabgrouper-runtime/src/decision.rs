//! Reading and normalizing model decisions.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use tabgrouper_protocols::{DEFAULT_GROUP_NAME, Group, GroupColor, GroupId, GroupingDecision};

use crate::error::{DecisionParseError, ValidationIssue};

/// Longest reasoning kept from a free-text answer.
const MAX_REASONING_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDecision {
    should_group: Option<bool>,
    group_name: Option<String>,
    color: Option<String>,
    existing_group_id: Option<Value>,
    reasoning: Option<String>,
}

/// Locate the first balanced `{...}` span, skipping braces inside strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the JSON object embedded in a model answer.
///
/// The result is raw; run it through [`normalize`] before use.
pub fn parse_decision(text: &str) -> Result<GroupingDecision, DecisionParseError> {
    let span = extract_json_object(text).ok_or(DecisionParseError::NoJsonObject)?;
    let raw: RawDecision = serde_json::from_str(span)
        .map_err(|e| DecisionParseError::InvalidJson(e.to_string()))?;

    let mut issues = Vec::new();
    let color = raw.color.as_deref().and_then(|c| match c.parse::<GroupColor>() {
        Ok(color) => Some(color),
        Err(_) => {
            issues.push(ValidationIssue::new("color", format!("invalid color '{}'", c)));
            Some(GroupColor::Grey)
        }
    });
    for issue in &issues {
        debug!("Corrected decision field {}: {}", issue.field, issue.message);
    }

    Ok(GroupingDecision {
        should_group: raw.should_group.unwrap_or(false),
        group_name: raw.group_name,
        color,
        existing_group_id: raw.existing_group_id.as_ref().and_then(group_id_from_value),
        reasoning: raw.reasoning.unwrap_or_default(),
    })
}

/// Guess a decision from free text.
pub fn heuristic_decision(text: &str) -> GroupingDecision {
    let lower = text.to_lowercase();
    let says_yes = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "yes")
        || lower.contains("should group");

    GroupingDecision {
        should_group: says_yes,
        reasoning: text.chars().take(MAX_REASONING_CHARS).collect(),
        ..Default::default()
    }
}

/// Parse a model answer, falling back to the free-text heuristic.
pub fn interpret(text: &str) -> GroupingDecision {
    match parse_decision(text) {
        Ok(decision) => decision,
        Err(e) => {
            debug!("Falling back to heuristic decision: {}", e);
            heuristic_decision(text)
        }
    }
}

/// Apply safe defaults to a decision.
///
/// A grouping decision gets a name and a color, and an existing group id
/// is kept only if that group is present in `groups`.
pub fn normalize(
    mut decision: GroupingDecision,
    groups: &[Group],
) -> (GroupingDecision, Vec<ValidationIssue>) {
    let mut issues = Vec::new();

    if let Some(id) = decision.existing_group_id {
        if !groups.iter().any(|g| g.id == id) {
            issues.push(ValidationIssue::new(
                "existingGroupId",
                format!("group {} does not exist", id),
            ));
            decision.existing_group_id = None;
        }
    }

    if decision.should_group {
        let blank = decision
            .group_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty());
        if blank {
            issues.push(ValidationIssue::new("groupName", "missing group name"));
            decision.group_name = Some(DEFAULT_GROUP_NAME.to_string());
        }
        if decision.color.is_none() {
            issues.push(ValidationIssue::new("color", "missing color"));
            decision.color = Some(GroupColor::Grey);
        }
    }

    for issue in &issues {
        debug!("Corrected decision field {}: {}", issue.field, issue.message);
    }
    (decision, issues)
}

fn group_id_from_value(value: &Value) -> Option<GroupId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
