use meson_core::typ::NamespaceBuilder;

/// `import()` name and the object type it returns.
const MODULES: &[(&str, &str)] = &[
    ("cmake", "cmake_module"),
    ("fs", "fs_module"),
    ("gnome", "gnome_module"),
    ("i18n", "i18n_module"),
    ("keyval", "keyval_module"),
    ("pkgconfig", "pkgconfig_module"),
    ("python", "python_module"),
    ("sourceset", "sourceset_module"),
    ("windows", "windows_module"),
];

/// Register the module object types and their `import()` names.
pub fn register_types(ns: &mut NamespaceBuilder) {
    for (_, object) in MODULES {
        ns.object(object, Some("module"));
    }
    ns.object("python_installation", Some("external_program"))
        .object("cmake_subproject", None)
        .object("cmake_subproject_options", None)
        .object("sourceset", None)
        .object("source_configuration", None);
    for (name, object) in MODULES {
        ns.module(name, object);
    }
}

/// Register the methods of every module object.
pub fn register_methods(ns: &mut NamespaceBuilder) {
    register_fs(ns);
    register_gnome(ns);
    register_python(ns);
    register_cmake(ns);
    register_sourceset(ns);

    ns.method("pkgconfig_module", "generate", "void")
        .opt("library", "lib")
        .kw("description", "str")
        .kw("extra_cflags", "list(str)")
        .kw("filebase", "str")
        .kw("install_dir", "str")
        .kw("libraries", "list(lib|dep|str)")
        .kw("libraries_private", "list(lib|dep|str)")
        .kw("name", "str")
        .kw("requires", "list(str|dep|lib)")
        .kw("requires_private", "list(str|dep|lib)")
        .kw("subdirs", "list(str)")
        .kw("url", "str")
        .kw("variables", "dict(str)|list(str)")
        .kw("version", "str");

    ns.method("i18n_module", "gettext", "list(custom_tgt)")
        .pos("packagename", "str")
        .kw("args", "list(str)")
        .kw("data_dirs", "list(str)")
        .kw("install", "bool")
        .kw("install_dir", "str")
        .kw("languages", "list(str)")
        .kw("preset", "str");
    ns.method("i18n_module", "merge_file", "custom_tgt")
        .kw("args", "list(str)")
        .kw("data_dirs", "list(str)")
        .kw("input", "list(str|file|custom_tgt|custom_idx)")
        .kw("install", "bool")
        .kw("install_dir", "str")
        .kw("output", "str")
        .kw("po_dir", "str")
        .kw("type", "str");
    ns.method("i18n_module", "itstool_join", "custom_tgt")
        .kw("its_files", "list(str|file)")
        .kw("mo_targets", "list(custom_tgt)")
        .kw("input", "list(str|file)")
        .kw("output", "str")
        .kw("install", "bool")
        .kw("install_dir", "str");

    ns.method("keyval_module", "load", "dict(str)").pos("file", "str|file");

    ns.method("windows_module", "compile_resources", "list(custom_tgt)")
        .varargs("libs", "str|file|custom_tgt|custom_idx")
        .kw("args", "list(str)")
        .kw("depend_files", "list(str|file)")
        .kw("depends", "list(build_tgt|custom_tgt)")
        .kw("include_directories", "list(inc|str)");
}

fn register_fs(ns: &mut NamespaceBuilder) {
    for name in ["exists", "is_absolute", "is_dir", "is_file", "is_symlink"] {
        ns.method("fs_module", name, "bool").pos("file", "str|file");
    }
    for name in ["as_posix", "expanduser", "name", "parent", "stem"] {
        ns.method("fs_module", name, "str").pos("file", "str|file");
    }
    ns.method("fs_module", "copyfile", "custom_tgt")
        .pos("src", "str|file")
        .opt("dst", "str")
        .kw("install", "bool")
        .kw("install_dir", "str")
        .kw("install_mode", "list(str|int)")
        .kw("install_tag", "str");
    ns.method("fs_module", "hash", "str").pos("file", "str|file").pos("hash_algorithm", "str");
    ns.method("fs_module", "is_samepath", "bool").pos("path1", "str|file").pos("path2", "str|file");
    ns.method("fs_module", "read", "str").pos("file", "str|file").kw("encoding", "str");
    ns.method("fs_module", "relative_to", "str").pos("file", "str|file").pos("start", "str|file");
    ns.method("fs_module", "replace_suffix", "str").pos("file", "str|file").pos("suffix", "str");
    ns.method("fs_module", "size", "int").pos("file", "str|file");
}

fn register_gnome(ns: &mut NamespaceBuilder) {
    ns.method("gnome_module", "compile_resources", "list(custom_tgt)")
        .pos("id", "str")
        .pos("input_file", "str|file")
        .kw("c_name", "str")
        .kw("dependencies", "list(file|custom_tgt|custom_idx)")
        .kw("export", "bool")
        .kw("extra_args", "list(str)")
        .kw("gresource_bundle", "bool")
        .kw("install", "bool")
        .kw("install_dir", "str")
        .kw("source_dir", "list(str)");
    ns.method("gnome_module", "compile_schemas", "custom_tgt")
        .kw("build_by_default", "bool")
        .kw("depend_files", "list(str|file)");
    ns.method("gnome_module", "gdbus_codegen", "list(custom_tgt)")
        .pos("name", "str")
        .opt("source", "str|file")
        .kw("annotations", "list(str)")
        .kw("autocleanup", "str")
        .kw("docbook", "str")
        .kw("extra_args", "list(str)")
        .kw("install_header", "bool")
        .kw("install_dir", "str")
        .kw("interface_prefix", "str")
        .kw("namespace", "str")
        .kw("object_manager", "bool");
    ns.method("gnome_module", "generate_gir", "list(custom_tgt)")
        .varargs("target", "exe|lib")
        .kw("dependencies", "list(dep)")
        .kw("export_packages", "list(str)")
        .kw("extra_args", "list(str)")
        .kw("header", "list(str)")
        .kw("identifier_prefix", "list(str)")
        .kw("includes", "list(str|custom_tgt)")
        .kw("install", "bool")
        .kw("namespace", "str")
        .kw("nsversion", "str")
        .kw("sources", "list(str|file|custom_tgt|custom_idx|generated_list)")
        .kw("symbol_prefix", "list(str)");
    ns.method("gnome_module", "genmarshal", "list(custom_tgt)")
        .pos("basename", "str")
        .kw("extra_args", "list(str)")
        .kw("install_header", "bool")
        .kw("prefix", "str")
        .kw("sources", "list(str|file)");
    for name in ["mkenums", "mkenums_simple"] {
        ns.method("gnome_module", name, "list(custom_tgt)")
            .pos("name", "str")
            .kw("c_template", "str|file")
            .kw("h_template", "str|file")
            .kw("identifier_prefix", "str")
            .kw("install_header", "bool")
            .kw("sources", "list(str|file|custom_tgt|custom_idx)")
            .kw("symbol_prefix", "str");
    }
    ns.method("gnome_module", "post_install", "void")
        .kws(&["glib_compile_schemas", "gio_querymodules_dummy", "gtk_update_icon_cache", "update_desktop_database"], "bool")
        .kw("gio_querymodules", "list(str)");
    ns.method("gnome_module", "yelp", "void")
        .pos("project_id", "str")
        .varargs("source", "str")
        .kw("languages", "list(str)")
        .kw("media", "list(str)")
        .kw("sources", "list(str)")
        .kw("symlink_media", "bool");
}

fn register_python(ns: &mut NamespaceBuilder) {
    ns.method("python_module", "find_installation", "python_installation")
        .opt("name_or_path", "str")
        .kw("disabler", "bool")
        .kw("modules", "list(str)")
        .kw("pure", "bool")
        .kw("required", "bool|feature");
    ns.method("python_installation", "dependency", "dep")
        .kw("disabler", "bool")
        .kw("embed", "bool")
        .kw("required", "bool|feature")
        .kw("static", "bool");
    ns.method("python_installation", "extension_module", "lib")
        .pos("module_name", "str")
        .varargs("source", crate::functions::SOURCES)
        .kw("dependencies", "list(dep)")
        .kw("include_directories", "list(inc|str)")
        .kw("install", "bool")
        .kw("link_with", "list(lib|custom_tgt|custom_idx)")
        .kw("subdir", "str");
    ns.method("python_installation", "get_install_dir", "str")
        .kw("pure", "bool")
        .kw("subdir", "str");
    ns.method("python_installation", "get_path", "str").pos("path_name", "str").opt("fallback", "any");
    ns.method("python_installation", "get_variable", "str").pos("variable_name", "str").opt("fallback", "any");
    ns.method("python_installation", "has_path", "bool").pos("path_name", "str");
    ns.method("python_installation", "has_variable", "bool").pos("variable_name", "str");
    ns.method("python_installation", "install_sources", "void")
        .varargs("file", "str|file")
        .kw("install_tag", "str")
        .kw("preserve_path", "bool")
        .kw("pure", "bool")
        .kw("subdir", "str");
    ns.method("python_installation", "language_version", "str");
}

fn register_cmake(ns: &mut NamespaceBuilder) {
    ns.method("cmake_module", "subproject", "cmake_subproject")
        .pos("subproject_name", "str")
        .kw("options", "cmake_subproject_options")
        .kw("required", "bool|feature");
    ns.method("cmake_module", "subproject_options", "cmake_subproject_options");
    ns.method("cmake_module", "configure_package_config_file", "void")
        .kw("configuration", "cfg_data")
        .kw("input", "str|file")
        .kw("install_dir", "str")
        .kw("name", "str");
    ns.method("cmake_module", "write_basic_package_version_file", "void")
        .kw("arch_independent", "bool")
        .kw("compatibility", "str")
        .kw("install_dir", "str")
        .kw("name", "str")
        .kw("version", "str");

    ns.method("cmake_subproject", "dependency", "dep").pos("target", "str");
    ns.method("cmake_subproject", "found", "bool");
    ns.method("cmake_subproject", "get_variable", "any").pos("var_name", "str").opt("fallback", "any");
    ns.method("cmake_subproject", "include_directories", "inc").pos("target", "str");
    ns.method("cmake_subproject", "target", "tgt").pos("target", "str");
    ns.method("cmake_subproject", "target_list", "list(str)");
    ns.method("cmake_subproject", "target_type", "str").pos("target", "str");

    ns.method("cmake_subproject_options", "add_cmake_defines", "void").varargs("defines", "dict(str|int|bool)");
    ns.method("cmake_subproject_options", "set_install", "void")
        .pos("install", "bool")
        .kw("target", "str");
    ns.method("cmake_subproject_options", "set_override_option", "void")
        .pos("opt", "str")
        .pos("val", "str")
        .kw("target", "str");
    ns.method("cmake_subproject_options", "append_compile_args", "void")
        .pos("language", "str")
        .varargs("arg", "str");
    ns.method("cmake_subproject_options", "append_link_args", "void").varargs("arg", "str");
}

fn register_sourceset(ns: &mut NamespaceBuilder) {
    ns.method("sourceset_module", "source_set", "sourceset");
    ns.method("sourceset", "add", "void")
        .varargs("source", "str|file|generated_list|custom_tgt|custom_idx|dep")
        .kw("if_true", "list(str|file|generated_list|custom_tgt|custom_idx|dep)")
        .kw("if_false", "list(str|file|generated_list|custom_tgt|custom_idx)")
        .kw("when", "list(str|dep)");
    ns.method("sourceset", "add_all", "void")
        .varargs("source_set", "sourceset")
        .kw("if_true", "list(sourceset)")
        .kw("when", "list(str|dep)");
    ns.method("sourceset", "all_dependencies", "list(dep)");
    ns.method("sourceset", "all_sources", "list(file|custom_tgt|custom_idx|generated_list)");
    ns.method("sourceset", "apply", "source_configuration")
        .pos("config", "cfg_data|dict(str|int|bool)")
        .kw("strict", "bool");
    ns.method("source_configuration", "dependencies", "list(dep)");
    ns.method("source_configuration", "sources", "list(file|custom_tgt|custom_idx|generated_list)");
}
