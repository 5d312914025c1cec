use meson_core::typ::NamespaceBuilder;

/// Register the methods of `str`, `int`, `bool`, `list` and `dict`.
pub fn register(ns: &mut NamespaceBuilder) {
    register_str(ns);

    ns.method("int", "is_even", "bool");
    ns.method("int", "is_odd", "bool");
    ns.method("int", "to_string", "str").kw("fill", "int");

    ns.method("bool", "to_int", "int");
    ns.method("bool", "to_string", "str")
        .opt("true_str", "str")
        .opt("false_str", "str");

    // element-aware results of get() and keys() are computed by the analyzer
    ns.method("list", "contains", "bool").pos("item", "any");
    ns.method("list", "get", "any").pos("index", "int").opt("fallback", "any");
    ns.method("list", "length", "int");

    ns.method("dict", "get", "any").pos("key", "str").opt("fallback", "any");
    ns.method("dict", "has_key", "bool").pos("key", "str");
    ns.method("dict", "keys", "list(str)");
}

fn register_str(ns: &mut NamespaceBuilder) {
    ns.method("str", "contains", "bool").pos("fragment", "str");
    ns.method("str", "endswith", "bool").pos("fragment", "str");
    ns.method("str", "format", "str").varargs("fmt", "int|bool|str");
    ns.method("str", "join", "str").varargs("strings", "str|list(str)");
    ns.method("str", "replace", "str").pos("old", "str").pos("new", "str");
    ns.method("str", "split", "list(str)").opt("split_string", "str");
    ns.method("str", "splitlines", "list(str)");
    ns.method("str", "startswith", "bool").pos("fragment", "str");
    ns.method("str", "strip", "str").opt("strip_chars", "str");
    ns.method("str", "substring", "str").opt("start", "int").opt("end", "int");
    ns.method("str", "to_int", "int");
    ns.method("str", "to_lower", "str");
    ns.method("str", "to_upper", "str");
    ns.method("str", "underscorify", "str");
    ns.method("str", "version_compare", "bool").pos("comparison", "str");
}
