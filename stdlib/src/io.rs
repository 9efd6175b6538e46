use crate::Group;

/// `io` group: file access.
pub fn group() -> Group {
    Group::new()
        .function("read_file", &["path"])
        .function("write_file", &["path", "contents"])
        .function("append_file", &["path", "contents"])
        .function("exists", &["path"])
}
