use crate::Group;

/// `list` group: collection helpers.
pub fn group() -> Group {
    Group::new()
        .function("first", &["collection"])
        .function("last", &["collection"])
        .function("reverse", &["collection"])
        .function("sort", &["collection"])
        .function("map", &["collection", "transform"])
        .function("filter", &["collection", "predicate"])
        .function("reduce", &["collection", "initial", "combine"])
}
