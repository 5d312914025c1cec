use crate::typ::TypeNamespace;

/// Small catalog shaped like the real one, for unit tests.
pub(crate) fn mini_namespace() -> TypeNamespace {
    let mut ns = TypeNamespace::builder();
    ns.object("meson", None)
        .object("build_machine", None)
        .object("host_machine", Some("build_machine"))
        .object("tgt", None)
        .object("build_tgt", Some("tgt"))
        .object("exe", Some("build_tgt"))
        .object("lib", Some("build_tgt"))
        .object("custom_tgt", Some("tgt"))
        .object("custom_idx", None)
        .object("file", None)
        .object("dep", None)
        .object("range", None)
        .object("module", None)
        .object("fs_module", Some("module"));
    ns.module("fs", "fs_module");
    ns.global("meson", "meson").global("build_machine", "build_machine").global("host_machine", "host_machine");

    ns.function("project", "void")
        .pos("project_name", "str")
        .varargs("language", "str")
        .kw("version", "str")
        .kw("default_options", "list(str)|dict(str|int|bool)");
    ns.function("message", "void").varargs("text", "str|int|bool|list(str|int|bool)|dict(any)");
    ns.function("files", "list(file)").varargs("file", "str");
    ns.function("executable", "exe")
        .pos("target_name", "str")
        .varargs("source", "str|file|custom_tgt|custom_idx")
        .kw("install", "bool")
        .kw("link_with", "list(lib)")
        .kw("dependencies", "list(dep)");
    ns.function("library", "lib").pos("target_name", "str").varargs("source", "str|file");
    ns.function("custom_target", "custom_tgt").opt("name", "str").req_kw("output", "list(str)");
    ns.function("dependency", "dep").varargs("names", "str").kw("required", "bool");
    ns.function("import", "module").pos("module_name", "str");
    ns.function("subdir", "void").pos("dir_name", "str").kw("if_found", "list(dep)");
    ns.function("range", "range").pos("start", "int").opt("stop", "int").opt("step", "int");
    ns.function("get_variable", "any").pos("variable_name", "str").opt("default", "any");
    ns.function("set_variable", "void").pos("variable_name", "str").pos("value", "any");

    ns.method("meson", "project_version", "str");
    ns.method("meson", "version", "str");
    ns.method("build_machine", "system", "str");
    ns.method("host_machine", "endian", "str");
    ns.method("tgt", "full_path", "str");
    ns.method("build_tgt", "name", "str");
    ns.method("dep", "found", "bool");
    ns.method("fs_module", "exists", "bool").pos("file", "str");
    ns.method("str", "split", "list(str)").opt("separator", "str");
    ns.method("str", "to_upper", "str");
    ns.method("str", "format", "str").varargs("fmt", "int|bool|str");
    ns.method("int", "to_string", "str");
    ns.method("bool", "to_string", "str").opt("true_str", "str").opt("false_str", "str");
    ns.method("list", "length", "int");
    ns.method("list", "contains", "bool").pos("item", "any");
    ns.method("list", "get", "any").pos("index", "int").opt("fallback", "any");
    ns.method("dict", "get", "any").pos("key", "str").opt("fallback", "any");
    ns.method("dict", "keys", "list(str)");
    ns.method("dict", "has_key", "bool").pos("key", "str");
    ns.build().expect("test catalog is valid")
}
