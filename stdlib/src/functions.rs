use meson_core::typ::{FunctionDecl, NamespaceBuilder};

/// Anything a build target accepts as a source.
pub(crate) const SOURCES: &str = "str|file|custom_tgt|custom_idx|generated_list|structured_src|extracted_obj|lib";
const LINK_TARGETS: &str = "list(lib|custom_tgt|custom_idx)";
const INCLUDES: &str = "list(inc|str)";
const ARGS: &str = "list(str)";
const INSTALL_DIR: &str = "str|bool|list(str|bool)";
const ENV: &str = "env|list(str)|dict(str|list(str))";
const COMMAND: &str = "list(str|file|exe|external_program|custom_tgt|custom_idx)";

/// Keyword arguments shared by every `build_target()` flavour.
fn target_kwargs(f: &mut FunctionDecl) -> &mut FunctionDecl {
    f.kws(
        &[
            "c_args",
            "cpp_args",
            "objc_args",
            "objcpp_args",
            "rust_args",
            "vala_args",
            "fortran_args",
            "d_args",
            "cs_args",
            "cuda_args",
            "link_args",
        ],
        ARGS,
    )
    .kws(&["c_pch", "cpp_pch"], "str|file")
    .kws(
        &["build_by_default", "install", "implicit_include_directories", "pie", "win_subsystem_console"],
        "bool",
    )
    .kws(&["build_rpath", "install_rpath", "override_dir", "gnu_symbol_visibility", "rust_crate_type"], "str")
    .kw("dependencies", "list(dep)")
    .kw("extra_files", "list(str|file)")
    .kw("include_directories", INCLUDES)
    .kw("install_dir", INSTALL_DIR)
    .kw("install_mode", "list(str|int)")
    .kw("install_tag", "str")
    .kw("link_depends", "list(str|file|custom_tgt|custom_idx)")
    .kw("link_language", "str")
    .kw("link_whole", LINK_TARGETS)
    .kw("link_with", LINK_TARGETS)
    .kw("native", "bool")
    .kw("objects", "list(extracted_obj|file|str)")
    .kw("sources", &format!("list({})", SOURCES))
    .kw("name_prefix", "str|list")
    .kw("name_suffix", "str|list")
    .kw("override_options", "list(str)|dict(str|int|bool)")
}

fn library_kwargs(f: &mut FunctionDecl) -> &mut FunctionDecl {
    target_kwargs(f)
        .kws(&["version", "soversion", "darwin_versions", "vs_module_defs"], "str|int|file|list(str|int)")
        .kw("pic", "bool")
        .kw("prelink", "bool")
}

/// Register the global functions.
pub fn register(ns: &mut NamespaceBuilder) {
    ns.function("project", "void")
        .pos("project_name", "str")
        .varargs("language", "str|list(str)")
        .kw("default_options", "list(str)|dict(str|int|bool)")
        .kw("license", "str|list(str)")
        .kw("license_files", "str|list(str)")
        .kw("meson_version", "str")
        .kw("subproject_dir", "str")
        .kw("version", "str|file");

    for name in ["add_global_arguments", "add_global_link_arguments", "add_project_arguments", "add_project_link_arguments"] {
        ns.function(name, "void")
            .varargs("arg", "str|list(str)")
            .req_kw("language", "list(str)")
            .kw("native", "bool");
    }
    ns.function("add_project_dependencies", "void")
        .varargs("dependencies", "dep|list(dep)")
        .kw("language", "list(str)")
        .kw("native", "bool");
    ns.function("add_languages", "bool")
        .varargs("language", "str|list(str)")
        .kw("native", "bool")
        .kw("required", "bool|feature");
    ns.function("add_test_setup", "void")
        .pos("setup_name", "str")
        .kw("env", ENV)
        .kw("exclude_suites", "list(str)")
        .kw("exe_wrapper", "list(str|external_program)")
        .kw("gdb", "bool")
        .kw("is_default", "bool")
        .kw("timeout_multiplier", "int");
    ns.function("alias_target", "alias_tgt")
        .pos("target_name", "str")
        .varargs("dep", "tgt");
    ns.function("assert", "void").pos("condition", "bool").opt("message", "str");
    for name in ["benchmark", "test"] {
        ns.function(name, "void")
            .pos("name", "str")
            .pos("executable", "exe|jar|external_program|file|custom_tgt|custom_idx")
            .kw("args", "list(str|file|tgt|external_program)")
            .kw("depends", "list(build_tgt|custom_tgt)")
            .kw("env", ENV)
            .kw("is_parallel", "bool")
            .kw("priority", "int")
            .kw("protocol", "str")
            .kw("should_fail", "bool")
            .kw("suite", "str|list(str)")
            .kw("timeout", "int")
            .kw("verbose", "bool")
            .kw("workdir", "str");
    }

    library_kwargs(
        ns.function("both_libraries", "both_libs")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    );
    library_kwargs(ns.function("library", "lib").pos("target_name", "str").varargs("source", SOURCES));
    library_kwargs(
        ns.function("shared_library", "lib")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    );
    library_kwargs(
        ns.function("static_library", "lib")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    );
    target_kwargs(
        ns.function("shared_module", "lib")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    );
    target_kwargs(
        ns.function("executable", "exe")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    )
    .kw("export_dynamic", "bool")
    .kw("implib", "bool|str")
    .kw("win_subsystem", "str");
    target_kwargs(ns.function("jar", "jar").pos("target_name", "str").varargs("source", SOURCES))
        .kw("main_class", "str")
        .kw("java_resources", "structured_src");
    library_kwargs(
        ns.function("build_target", "build_tgt")
            .pos("target_name", "str")
            .varargs("source", SOURCES),
    )
    .req_kw("target_type", "str");

    ns.function("configuration_data", "cfg_data").opt("data", "dict(str|int|bool)");
    ns.function("configure_file", "file")
        .kw("capture", "bool")
        .kw("command", COMMAND)
        .kw("configuration", "cfg_data|dict(str|int|bool)")
        .kw("copy", "bool")
        .kw("depfile", "str")
        .kw("encoding", "str")
        .kw("format", "str")
        .kw("input", "list(str|file)")
        .kw("install", "bool")
        .kw("install_dir", "str|bool")
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "str")
        .kw("output", "str")
        .kw("output_format", "str");
    ns.function("custom_target", "custom_tgt")
        .opt("name", "str")
        .kw("build_always_stale", "bool")
        .kw("build_by_default", "bool")
        .kw("capture", "bool")
        .kw("command", COMMAND)
        .kw("console", "bool")
        .kw("depend_files", "list(str|file)")
        .kw("depends", "list(build_tgt|custom_tgt)")
        .kw("depfile", "str")
        .kw("env", ENV)
        .kw("feed", "bool")
        .kw("input", "list(str|file|custom_tgt|custom_idx|generated_list|extracted_obj)")
        .kw("install", "bool")
        .kw("install_dir", INSTALL_DIR)
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "list(str)")
        .req_kw("output", "list(str)");
    ns.function("declare_dependency", "dep")
        .kw("compile_args", ARGS)
        .kw("d_import_dirs", INCLUDES)
        .kw("dependencies", "list(dep)")
        .kw("extra_files", "list(str|file)")
        .kw("include_directories", INCLUDES)
        .kw("link_args", ARGS)
        .kw("link_whole", LINK_TARGETS)
        .kw("link_with", LINK_TARGETS)
        .kw("objects", "list(extracted_obj)")
        .kw("sources", &format!("list({})", SOURCES))
        .kw("variables", "dict(str)|list(str)")
        .kw("version", "str");
    ns.function("dependency", "dep")
        .varargs("names", "str")
        .kw("allow_fallback", "bool")
        .kw("default_options", "list(str)|dict(str|int|bool)")
        .kw("disabler", "bool")
        .kw("fallback", "list(str)|str")
        .kw("include_type", "str")
        .kw("language", "str")
        .kw("method", "str")
        .kw("modules", "list(str)")
        .kw("native", "bool")
        .kw("not_found_message", "str")
        .kw("required", "bool|feature")
        .kw("static", "bool")
        .kw("version", "list(str)|str");
    ns.function("disabler", "disabler");
    ns.function("environment", "env")
        .opt("env", "str|list(str)|dict(str|list(str))")
        .kw("method", "str")
        .kw("separator", "str");
    for name in ["error", "message", "warning", "debug"] {
        ns.function(name, "void").varargs("text", "str|int|bool|list(str|int|bool)|dict(str|int|bool)");
    }
    ns.function("files", "list(file)").varargs("file", "str|file");
    ns.function("find_program", "external_program")
        .varargs("program_name", "str|file")
        .kw("dirs", "list(str)")
        .kw("disabler", "bool")
        .kw("native", "bool")
        .kw("required", "bool|feature")
        .kw("version", "str|list(str)");
    ns.function("generator", "generator")
        .pos("exe", "exe|external_program")
        .kw("arguments", "list(str)")
        .kw("capture", "bool")
        .kw("depends", "list(build_tgt|custom_tgt)")
        .kw("depfile", "str")
        .kw("output", "list(str)");
    ns.function("get_option", "str|int|bool|feature|list(str)").pos("option_name", "str");
    ns.function("get_variable", "any").pos("variable_name", "str").opt("default", "any");
    ns.function("import", "module")
        .pos("module_name", "str")
        .kw("disabler", "bool")
        .kw("required", "bool|feature");
    ns.function("include_directories", "inc")
        .varargs("includes", "str|inc")
        .kw("is_system", "bool");
    ns.function("install_data", "void")
        .varargs("file", "file|str")
        .kw("follow_symlinks", "bool")
        .kw("install_dir", "str")
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "str")
        .kw("preserve_path", "bool")
        .kw("rename", "list(str)")
        .kw("sources", "list(file|str)");
    ns.function("install_emptydir", "void")
        .varargs("dirpath", "str")
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "str");
    ns.function("install_headers", "void")
        .varargs("file", "file|str")
        .kw("follow_symlinks", "bool")
        .kw("install_dir", "str")
        .kw("install_mode", "list(str|int)")
        .kw("preserve_path", "bool")
        .kw("subdir", "str");
    ns.function("install_man", "void")
        .varargs("file", "file|str")
        .kw("install_dir", "str")
        .kw("install_mode", "list(str|int)")
        .kw("locale", "str");
    ns.function("install_subdir", "void")
        .pos("subdir_name", "str")
        .kw("exclude_directories", "list(str)")
        .kw("exclude_files", "list(str)")
        .kw("follow_symlinks", "bool")
        .kw("install_dir", "str")
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "str")
        .kw("strip_directory", "bool");
    ns.function("install_symlink", "void")
        .pos("link_name", "str")
        .req_kw("install_dir", "str")
        .req_kw("pointing_to", "str")
        .kw("install_tag", "str");
    ns.function("is_disabler", "bool").pos("var", "any");
    ns.function("is_variable", "bool").pos("var", "str");
    ns.function("join_paths", "str").varargs("part", "str");
    ns.function("range", "range").pos("start", "int").opt("stop", "int").opt("step", "int");
    ns.function("run_command", "runresult")
        .varargs("command", "str|file|external_program")
        .kw("capture", "bool")
        .kw("check", "bool")
        .kw("env", ENV);
    ns.function("run_target", "run_tgt")
        .pos("target_name", "str")
        .req_kw("command", COMMAND)
        .kw("depends", "list(build_tgt|custom_tgt)")
        .kw("env", ENV);
    ns.function("set_variable", "void").pos("variable_name", "str").pos("value", "any");
    ns.function("structured_sources", "structured_src")
        .pos("root", "list(str|file|custom_tgt|custom_idx|generated_list)")
        .opt("additional", "dict(str|file|custom_tgt|custom_idx|generated_list)");
    ns.function("subdir", "void")
        .pos("dir_name", "str")
        .kw("if_found", "list(dep)");
    ns.function("subdir_done", "void");
    ns.function("subproject", "subproject")
        .pos("subproject_name", "str")
        .kw("default_options", "list(str)|dict(str|int|bool)")
        .kw("required", "bool|feature")
        .kw("version", "str");
    ns.function("summary", "void")
        .pos("key_or_dict", "str|dict(str|bool|int|dep|external_program|list(str|bool|int|dep|external_program))")
        .opt("value", "str|bool|int|dep|external_program|list(str|bool|int|dep|external_program)")
        .kw("bool_yn", "bool")
        .kw("list_sep", "str")
        .kw("section", "str");
    ns.function("unset_variable", "void").pos("varname", "str");
    ns.function("vcs_tag", "custom_tgt")
        .kw("command", "list(str|file|exe|external_program)")
        .kw("fallback", "str")
        .req_kw("input", "str|file")
        .req_kw("output", "str")
        .kw("replace_string", "str");
}
