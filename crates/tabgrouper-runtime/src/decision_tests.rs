use super::*;

fn groups() -> Vec<Group> {
    vec![Group::new(456, "Development", GroupColor::Blue, 1)]
}

#[test]
fn test_extract_plain_object() {
    let text = r#"{"shouldGroup": true}"#;
    assert_eq!(extract_json_object(text), Some(text));
}

#[test]
fn test_extract_with_surrounding_prose() {
    let text = "Sure! Here is my answer:\n```json\n{\"shouldGroup\": false, \"reasoning\": \"x\"}\n```\nThanks {bye}";
    assert_eq!(
        extract_json_object(text),
        Some("{\"shouldGroup\": false, \"reasoning\": \"x\"}")
    );
}

#[test]
fn test_extract_nested_and_braces_in_strings() {
    let text = r#"prefix {"a": {"b": "}{"}, "c": "quote \" }"} suffix"#;
    assert_eq!(
        extract_json_object(text),
        Some(r#"{"a": {"b": "}{"}, "c": "quote \" }"}"#)
    );
}

#[test]
fn test_extract_unbalanced() {
    assert_eq!(extract_json_object("{\"shouldGroup\": true"), None);
    assert_eq!(extract_json_object("no json here"), None);
}

#[test]
fn test_parse_full_decision() {
    let text = r#"{"shouldGroup": true, "groupName": "Work Tools", "color": "purple", "existingGroupId": null, "reasoning": "Both are work apps"}"#;
    let decision = parse_decision(text).unwrap();
    assert!(decision.should_group);
    assert_eq!(decision.group_name.as_deref(), Some("Work Tools"));
    assert_eq!(decision.color, Some(GroupColor::Purple));
    assert!(decision.existing_group_id.is_none());
    assert_eq!(decision.reasoning, "Both are work apps");
}

#[test]
fn test_parse_invalid_color_becomes_grey() {
    let decision = parse_decision(r#"{"shouldGroup": true, "groupName": "X", "color": "magenta"}"#).unwrap();
    assert_eq!(decision.color, Some(GroupColor::Grey));
}

#[test]
fn test_parse_string_group_id() {
    let decision = parse_decision(r#"{"shouldGroup": true, "existingGroupId": "456"}"#).unwrap();
    assert_eq!(decision.existing_group_id, Some(456));
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse_decision("nothing"), Err(DecisionParseError::NoJsonObject));
    assert!(matches!(
        parse_decision("{shouldGroup: yes}"),
        Err(DecisionParseError::InvalidJson(_))
    ));
}

#[test]
fn test_heuristic_yes() {
    let decision = heuristic_decision("Yes, these tabs belong together.");
    assert!(decision.should_group);
    assert!(decision.group_name.is_none());
}

#[test]
fn test_heuristic_should_group_phrase() {
    assert!(heuristic_decision("I think you should group them").should_group);
}

#[test]
fn test_heuristic_no() {
    let decision = heuristic_decision("No, eyes on the road. These are unrelated.");
    assert!(!decision.should_group);
}

#[test]
fn test_heuristic_truncates_reasoning() {
    let text = "é".repeat(500);
    let decision = heuristic_decision(&text);
    assert_eq!(decision.reasoning.chars().count(), 200);
}

#[test]
fn test_interpret_prefers_json() {
    let decision = interpret("Answer: {\"shouldGroup\": false, \"reasoning\": \"yes but no\"}");
    assert!(!decision.should_group);
}

#[test]
fn test_interpret_falls_back() {
    let decision = interpret("yes");
    assert!(decision.should_group);
    assert_eq!(decision.reasoning, "yes");
}

#[test]
fn test_normalize_defaults_name_and_color() {
    let decision = GroupingDecision {
        should_group: true,
        group_name: Some("   ".to_string()),
        ..Default::default()
    };
    let (decision, issues) = normalize(decision, &groups());
    assert_eq!(decision.group_name.as_deref(), Some("Uncategorized"));
    assert_eq!(decision.color, Some(GroupColor::Grey));
    assert_eq!(issues.len(), 2);
}

#[test]
fn test_normalize_drops_unknown_group() {
    let decision = GroupingDecision::new_group("Dev", GroupColor::Blue, "").into_existing(Some(999));
    let (decision, issues) = normalize(decision, &groups());
    assert!(decision.existing_group_id.is_none());
    assert_eq!(issues[0].field, "existingGroupId");
}

#[test]
fn test_normalize_keeps_known_group() {
    let decision = GroupingDecision::new_group("Dev", GroupColor::Blue, "").into_existing(Some(456));
    let (decision, issues) = normalize(decision, &groups());
    assert_eq!(decision.existing_group_id, Some(456));
    assert!(issues.is_empty());
}

#[test]
fn test_normalize_leaves_no_group_alone() {
    let (decision, issues) = normalize(GroupingDecision::no_group("unrelated"), &groups());
    assert!(!decision.should_group);
    assert!(decision.group_name.is_none());
    assert!(issues.is_empty());
}
