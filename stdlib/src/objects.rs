use meson_core::typ::{FunctionDecl, NamespaceBuilder};

/// Object types with their parent, parents listed before children.
const OBJECTS: &[(&str, Option<&str>)] = &[
    ("meson", None),
    ("build_machine", None),
    ("host_machine", Some("build_machine")),
    ("target_machine", Some("build_machine")),
    ("compiler", None),
    ("dep", None),
    ("tgt", None),
    ("build_tgt", Some("tgt")),
    ("exe", Some("build_tgt")),
    ("lib", Some("build_tgt")),
    ("jar", Some("build_tgt")),
    ("both_libs", Some("lib")),
    ("custom_tgt", Some("tgt")),
    ("custom_idx", None),
    ("run_tgt", Some("tgt")),
    ("alias_tgt", Some("tgt")),
    ("cfg_data", None),
    ("env", None),
    ("external_program", None),
    ("extracted_obj", None),
    ("feature", None),
    ("file", None),
    ("generated_list", None),
    ("generator", None),
    ("inc", None),
    ("module", None),
    ("range", None),
    ("runresult", None),
    ("structured_src", None),
    ("subproject", None),
];

/// Register the object types and the globals bound in every root file.
pub fn register_types(ns: &mut NamespaceBuilder) {
    for (name, parent) in OBJECTS {
        ns.object(name, *parent);
    }
    ns.global("meson", "meson")
        .global("build_machine", "build_machine")
        .global("host_machine", "host_machine")
        .global("target_machine", "target_machine");
}

/// Register the methods of every object type.
pub fn register_methods(ns: &mut NamespaceBuilder) {
    register_meson(ns);
    register_machine(ns);
    register_compiler(ns);
    register_targets(ns);

    ns.method("dep", "as_link_whole", "dep");
    ns.method("dep", "as_system", "dep").opt("value", "str");
    ns.method("dep", "found", "bool");
    ns.method("dep", "get_configtool_variable", "str").pos("var_name", "str");
    ns.method("dep", "get_pkgconfig_variable", "str")
        .pos("var_name", "str")
        .kw("default", "str")
        .kw("define_variable", "list(str)");
    ns.method("dep", "get_variable", "str")
        .opt("varname", "str")
        .kws(&["cmake", "configtool", "default_value", "internal", "pkgconfig"], "str")
        .kw("pkgconfig_define", "list(str)");
    ns.method("dep", "include_type", "str");
    ns.method("dep", "name", "str");
    ns.method("dep", "partial_dependency", "dep")
        .kws(&["compile_args", "includes", "link_args", "links", "sources"], "bool");
    ns.method("dep", "type_name", "str");
    ns.method("dep", "version", "str");

    ns.method("cfg_data", "get", "str|int|bool").pos("varname", "str").opt("default_value", "str|int|bool");
    ns.method("cfg_data", "get_unquoted", "str|int|bool")
        .pos("varname", "str")
        .opt("default_value", "str|int|bool");
    ns.method("cfg_data", "has", "bool").pos("varname", "str");
    ns.method("cfg_data", "keys", "list(str)");
    ns.method("cfg_data", "merge_from", "void").pos("other", "cfg_data");
    for name in ["set", "set10", "set_quoted"] {
        ns.method("cfg_data", name, "void")
            .pos("varname", "str")
            .pos("value", "str|int|bool")
            .kw("description", "str");
    }

    for name in ["append", "prepend", "set"] {
        ns.method("env", name, "void")
            .pos("variable", "str")
            .varargs("value", "str")
            .kw("separator", "str");
    }
    ns.method("env", "unset", "void").pos("variable", "str");

    ns.method("external_program", "found", "bool");
    ns.method("external_program", "full_path", "str");
    ns.method("external_program", "path", "str");
    ns.method("external_program", "version", "str");

    for name in ["allowed", "auto", "disabled", "enabled"] {
        ns.method("feature", name, "bool");
    }
    for name in ["disable_auto_if", "enable_auto_if"] {
        ns.method("feature", name, "feature").pos("value", "bool");
    }
    for name in ["disable_if", "enable_if", "require"] {
        ns.method("feature", name, "feature").pos("value", "bool").kw("error_message", "str");
    }

    ns.method("file", "full_path", "str");
    ns.method("generator", "process", "generated_list")
        .varargs("source", "str|file|custom_tgt|custom_idx|generated_list")
        .kw("env", "env|list(str)|dict(str)")
        .kw("extra_args", "list(str)")
        .kw("preserve_path_from", "str");
    ns.method("runresult", "compiled", "bool");
    ns.method("runresult", "returncode", "int");
    ns.method("runresult", "stderr", "str");
    ns.method("runresult", "stdout", "str");
    ns.method("subproject", "found", "bool");
    ns.method("subproject", "get_variable", "any").pos("var_name", "str").opt("fallback", "any");
    ns.method("module", "found", "bool");
}

fn register_meson(ns: &mut NamespaceBuilder) {
    for name in ["add_dist_script", "add_install_script", "add_postconf_script"] {
        ns.method("meson", name, "void")
            .pos("script_name", "str|file|external_program|exe")
            .varargs("arg", "str|file|external_program|exe|custom_tgt|custom_idx")
            .kw("install_tag", "str")
            .kw("skip_if_destdir", "bool")
            .kw("dry_run", "bool");
    }
    ns.method("meson", "add_devenv", "void")
        .pos("env", "env|str|list(str)|dict(str)")
        .kw("method", "str")
        .kw("separator", "str");
    for name in [
        "backend",
        "build_root",
        "current_build_dir",
        "current_source_dir",
        "global_build_root",
        "global_source_root",
        "project_build_root",
        "project_license_files",
        "project_name",
        "project_source_root",
        "project_version",
        "source_root",
        "version",
    ] {
        ns.method("meson", name, "str");
    }
    ns.method("meson", "project_license", "list(str)");
    for name in ["can_run_host_binaries", "has_exe_wrapper", "is_cross_build", "is_subproject", "is_unity"] {
        ns.method("meson", name, "bool");
    }
    ns.method("meson", "build_options", "str");
    ns.method("meson", "get_compiler", "compiler").pos("language", "str").kw("native", "bool");
    ns.method("meson", "get_cross_property", "any")
        .pos("propname", "str")
        .opt("fallback_value", "any");
    ns.method("meson", "get_external_property", "any")
        .pos("propname", "str")
        .opt("fallback_value", "any")
        .kw("native", "bool");
    ns.method("meson", "has_external_property", "bool")
        .pos("propname", "str")
        .kw("native", "bool");
    ns.method("meson", "install_dependency_manifest", "void").pos("output_name", "str");
    ns.method("meson", "override_dependency", "void")
        .pos("name", "str")
        .pos("dep_object", "dep")
        .kw("native", "bool")
        .kw("static", "bool");
    ns.method("meson", "override_find_program", "void")
        .pos("progname", "str")
        .pos("program", "exe|file|external_program");
}

fn register_machine(ns: &mut NamespaceBuilder) {
    for name in ["cpu", "cpu_family", "endian", "kernel", "subsystem", "system"] {
        ns.method("build_machine", name, "str");
    }
}

/// Keyword arguments of the compiler's compile and link checks.
fn check(f: &mut FunctionDecl) {
    f.kw("args", "list(str)")
        .kw("dependencies", "list(dep)")
        .kw("include_directories", "list(inc|str)")
        .kw("no_builtin_args", "bool")
        .kw("prefix", "str|list(str)")
        .kw("required", "bool|feature");
}

fn register_compiler(ns: &mut NamespaceBuilder) {
    check(ns.method("compiler", "alignment", "int").pos("typename", "str"));
    check(ns.method("compiler", "check_header", "bool").pos("header_name", "str"));
    check(ns.method("compiler", "compiles", "bool").pos("code", "str|file").kw("name", "str").kw("werror", "bool"));
    check(
        ns.method("compiler", "compute_int", "int")
            .pos("expr", "str")
            .kws(&["guess", "high", "low"], "int"),
    );
    check(ns.method("compiler", "get_define", "str").pos("definename", "str"));
    check(ns.method("compiler", "has_define", "bool").pos("definename", "str"));
    check(ns.method("compiler", "has_function", "bool").pos("funcname", "str"));
    check(ns.method("compiler", "has_header", "bool").pos("header_name", "str"));
    check(
        ns.method("compiler", "has_header_symbol", "bool")
            .pos("header", "str")
            .pos("symbol", "str"),
    );
    check(ns.method("compiler", "has_member", "bool").pos("typename", "str").pos("membername", "str"));
    check(ns.method("compiler", "has_members", "bool").pos("typename", "str").varargs("member", "str"));
    check(ns.method("compiler", "has_type", "bool").pos("typename", "str"));
    check(ns.method("compiler", "links", "bool").pos("code", "str|file").kw("name", "str").kw("werror", "bool"));
    check(ns.method("compiler", "run", "runresult").pos("code", "str|file").kw("name", "str").kw("werror", "bool"));
    check(ns.method("compiler", "sizeof", "int").pos("typename", "str"));

    ns.method("compiler", "cmd_array", "list(str)");
    ns.method("compiler", "find_library", "dep")
        .pos("libname", "str")
        .kw("dirs", "list(str)")
        .kw("disabler", "bool")
        .kw("has_headers", "list(str)")
        .kw("required", "bool|feature")
        .kw("static", "bool");
    for name in ["first_supported_argument", "first_supported_link_argument"] {
        ns.method("compiler", name, "list(str)").varargs("arg", "str|list(str)");
    }
    for name in ["get_supported_arguments", "get_supported_link_arguments"] {
        ns.method("compiler", name, "list(str)")
            .varargs("arg", "str|list(str)")
            .kw("checked", "str");
    }
    ns.method("compiler", "get_supported_function_attributes", "list(str)").varargs("attribs", "str|list(str)");
    for name in ["get_argument_syntax", "get_id", "get_linker_id", "version"] {
        ns.method("compiler", name, "str");
    }
    for name in ["has_argument", "has_link_argument"] {
        ns.method("compiler", name, "bool").pos("argument", "str").kw("required", "bool|feature");
    }
    for name in ["has_multi_arguments", "has_multi_link_arguments"] {
        ns.method("compiler", name, "bool").varargs("arg", "str").kw("required", "bool|feature");
    }
    ns.method("compiler", "has_function_attribute", "bool")
        .pos("name", "str")
        .kw("required", "bool|feature");
    ns.method("compiler", "preprocess", "list(custom_idx)")
        .varargs("source", "str|file|custom_tgt|custom_idx|generated_list")
        .kw("compile_args", "list(str)")
        .kw("dependencies", "list(dep)")
        .kw("include_directories", "list(inc|str)")
        .kw("output", "str");
    ns.method("compiler", "symbols_have_underscore_prefix", "bool");
}

fn register_targets(ns: &mut NamespaceBuilder) {
    ns.method("build_tgt", "extract_all_objects", "extracted_obj").kw("recursive", "bool");
    ns.method("build_tgt", "extract_objects", "extracted_obj").varargs("source", "str|file");
    ns.method("build_tgt", "found", "bool");
    ns.method("build_tgt", "full_path", "str");
    ns.method("build_tgt", "name", "str");
    ns.method("build_tgt", "path", "str");
    ns.method("build_tgt", "private_dir_include", "inc");

    ns.method("both_libs", "get_shared_lib", "lib");
    ns.method("both_libs", "get_static_lib", "lib");

    ns.method("custom_tgt", "full_path", "str");
    ns.method("custom_tgt", "to_list", "list(custom_idx)");
    ns.method("custom_idx", "full_path", "str");
}
