use crate::Group;

/// `math` group: constants, numeric helpers, and the nested `random` group.
pub fn group() -> Group {
    Group::new()
        .variable("pi")
        .variable("e")
        .variable("tau")
        .function("abs", &["value"])
        .function("floor", &["value"])
        .function("ceil", &["value"])
        .function("round", &["value"])
        .function("sqrt", &["value"])
        .function("pow", &["base", "exponent"])
        .function("min", &["left", "right"])
        .function("max", &["left", "right"])
        .nested(
            "random",
            Group::new()
                .function("seed", &["value"])
                .function("next", &["min", "max"])
                .function("pick", &["collection"]),
        )
}
