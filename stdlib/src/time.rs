use crate::Group;

/// `time` group: clock access and formatting.
pub fn group() -> Group {
    Group::new()
        .variable("millis_per_second")
        .function("now", &[])
        .function("sleep", &["millis"])
        .function("format", &["timestamp", "pattern"])
}
