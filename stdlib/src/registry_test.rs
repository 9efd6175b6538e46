use super::*;

#[test]
fn test_lookup_top_level_group() {
    let math = lookup_group("math").expect("math group registered");
    assert!(math.has_variable("pi"));
    assert_eq!(math.function_parameters("pow"), Some(["base", "exponent"].as_slice()));
    assert!(lookup_group("nope").is_none());
}

#[test]
fn test_nested_group_chain() {
    let random = lookup_group("math").and_then(|g| g.group("random")).expect("math::random");
    assert_eq!(random.function_parameters("next"), Some(["min", "max"].as_slice()));
    assert!(random.group("deeper").is_none());
}

#[test]
fn test_native_function_table() {
    assert_eq!(native_function("range"), Some(["start", "end"].as_slice()));
    // Keys carry no sigil; the stripped form is what analyzers look up.
    assert!(native_function("@print").is_none());
    assert!(native_function("print").is_some());
}

#[test]
fn test_group_member_iteration() {
    let math = lookup_group("math").unwrap();
    let functions: Vec<&str> = math.functions().map(|(name, _)| name).collect();
    assert!(functions.contains(&"sqrt"));
    let groups: Vec<&str> = math.groups().collect();
    assert_eq!(groups, vec!["random"]);
}
