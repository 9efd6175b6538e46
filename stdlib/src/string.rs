use crate::Group;

/// `str` group: text helpers.
pub fn group() -> Group {
    Group::new()
        .function("upper", &["text"])
        .function("lower", &["text"])
        .function("trim", &["text"])
        .function("split", &["text", "separator"])
        .function("join", &["parts", "separator"])
        .function("contains", &["text", "needle"])
        .function("replace", &["text", "needle", "replacement"])
}
