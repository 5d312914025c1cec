use super::*;
use crate::{diagnostic::Severity, typ::test_catalog::mini_namespace};

fn analyze(src: &str) -> FileAnalysis {
    let ns = mini_namespace();
    let ast = Ast::parse(src);
    TypeAnalyzer::new(&ns, &ast, Path::new("meson.build")).analyze(Scope::root(&ns))
}

fn var(analysis: &FileAnalysis, name: &str) -> String {
    analysis
        .scope
        .get(name)
        .map(|b| b.types.to_string())
        .unwrap_or_else(|| panic!("'{}' is not bound", name))
}

fn messages(analysis: &FileAnalysis) -> Vec<String> {
    analysis.diagnostics().iter().map(|d| d.message.clone()).collect()
}

#[test]
fn test_literal_types() {
    let a = analyze("a = 1\nb = 'x'\nc = [1, 'a']\nd = {'k': true}\ne = a > 1\nf = not e\n");
    assert_eq!(var(&a, "a"), "int");
    assert_eq!(var(&a, "b"), "str");
    assert_eq!(var(&a, "c"), "list(int|str)");
    assert_eq!(var(&a, "d"), "dict(bool)");
    assert_eq!(var(&a, "e"), "bool");
    assert_eq!(var(&a, "f"), "bool");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_globals_are_bound() {
    let a = analyze("v = meson.version()\ns = host_machine.system()\n");
    assert_eq!(var(&a, "meson"), "meson");
    assert_eq!(var(&a, "v"), "str");
    // inherited from build_machine
    assert_eq!(var(&a, "s"), "str");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_branches_merge() {
    let a = analyze("if true\n  x = 1\nelse\n  x = 'a'\nendif\n");
    assert_eq!(var(&a, "x"), "int|str");
    assert_eq!(a.scope.get("x").unwrap().origins.len(), 2);
}

#[test]
fn test_if_without_else_keeps_earlier_binding() {
    let a = analyze("x = 1\nif meson.version() == '1'\n  x = 'a'\n  y = true\nendif\n");
    assert_eq!(var(&a, "x"), "int|str");
    assert_eq!(var(&a, "y"), "bool");
}

#[test]
fn test_elif_chain() {
    let a = analyze("if false\n  x = 1\nelif true\n  x = 'a'\nelse\n  x = [true]\nendif\n");
    assert_eq!(var(&a, "x"), "int|str|list(bool)");
}

#[test]
fn test_reassignment_replaces() {
    let a = analyze("x = 1\nx = 'a'\n");
    assert_eq!(var(&a, "x"), "str");
    let origins = &a.scope.get("x").unwrap().origins;
    assert_eq!(origins.len(), 1);
    assert_eq!(origins[0].span.start.line, 1);
}

#[test]
fn test_compound_assignment_keeps_origin() {
    let a = analyze("x = [1]\nx += 'a'\n");
    assert_eq!(var(&a, "x"), "list(int|str)");
    let origins = &a.scope.get("x").unwrap().origins;
    assert_eq!(origins.len(), 1);
    assert_eq!(origins[0].span.start.line, 0);
}

#[test]
fn test_unknown_identifier() {
    let a = analyze("y = z + 1\n");
    assert_eq!(messages(&a), vec!["Unknown identifier 'z'"]);
    assert_eq!(a.diagnostics()[0].severity, Severity::Error);
    assert_eq!(var(&a, "y"), "int");
}

#[test]
fn test_foreach_over_list() {
    let a = analyze("foreach s : ['a', 'b']\n  message(s)\nendforeach\n");
    assert_eq!(var(&a, "s"), "str");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_foreach_over_dict() {
    let a = analyze("foreach k, v : {'a': 1}\nendforeach\n");
    assert_eq!(var(&a, "k"), "str");
    assert_eq!(var(&a, "v"), "int");
}

#[test]
fn test_foreach_over_range() {
    let a = analyze("foreach i : range(3)\nendforeach\n");
    assert_eq!(var(&a, "i"), "int");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_foreach_variable_count() {
    let a = analyze("foreach k : {'a': 1}\nendforeach\n");
    assert_eq!(messages(&a), vec!["Iterating over a dict requires two loop variables"]);

    let a = analyze("foreach k, v : [1]\nendforeach\n");
    assert_eq!(messages(&a), vec!["Iterating over a list requires one loop variable"]);
}

#[test]
fn test_foreach_body_may_not_run() {
    let a = analyze("x = 1\nforeach s : ['a']\n  x = s\nendforeach\n");
    assert_eq!(var(&a, "x"), "int|str");
}

#[test]
fn test_unknown_function() {
    let a = analyze("foo(1)\n");
    assert_eq!(messages(&a), vec!["Unknown function 'foo'"]);
}

#[test]
fn test_positional_arity() {
    let a = analyze("executable()\n");
    assert_eq!(
        messages(&a),
        vec!["Missing positional argument 'target_name' in call to 'executable'"]
    );

    let a = analyze("r = range(1, 2, 3, 4)\n");
    assert_eq!(
        messages(&a),
        vec!["Too many positional arguments in call to 'range': expected at most 3, got 4"]
    );
}

#[test]
fn test_keyword_arguments() {
    let a = analyze("executable('a', 'main.c', instal: true)\n");
    assert_eq!(
        messages(&a),
        vec!["Unknown keyword argument 'instal' in call to 'executable'"]
    );

    let a = analyze("custom_target('gen')\n");
    assert_eq!(
        messages(&a),
        vec!["Missing keyword argument 'output' in call to 'custom_target'"]
    );

    let a = analyze("opts = {}\ncustom_target('gen', kwargs: opts)\n");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_argument_type_mismatch_is_a_warning() {
    let a = analyze("executable('a', 'main.c', install: 'yes')\n");
    assert_eq!(a.diagnostics().len(), 1);
    assert_eq!(a.diagnostics()[0].severity, Severity::Warning);
    assert!(a.diagnostics()[0].message.starts_with("Keyword argument 'install'"));

    let a = analyze("executable(1)\n");
    assert_eq!(a.diagnostics().len(), 1);
    assert_eq!(a.diagnostics()[0].severity, Severity::Warning);
    assert!(a.diagnostics()[0].message.starts_with("Argument 'target_name'"));
}

#[test]
fn test_partially_matching_union_is_accepted() {
    let a = analyze("if true\n  n = 'a'\nelse\n  n = 1\nendif\nexecutable(n)\n");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_single_value_for_list_kwarg() {
    let a = analyze("l = library('l')\nexecutable('a', link_with: l)\nexecutable('b', link_with: [l])\n");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_method_resolves_through_parents() {
    let a = analyze("e = executable('a', 'main.c')\np = e.full_path()\n");
    assert_eq!(var(&a, "e"), "exe");
    assert_eq!(var(&a, "p"), "str");
    let call = &a.metadata.method_calls[0];
    assert_eq!(call.methods.len(), 1);
    assert_eq!(call.methods[0].id(), "tgt.full_path");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_unknown_method() {
    let a = analyze("x = 'a'.nope()\n");
    assert_eq!(messages(&a), vec!["Unknown method 'nope' for type 'str'"]);
}

#[test]
fn test_method_on_union_resolves_for_some_members() {
    let a = analyze("if true\n  x = 'a'\nelse\n  x = 1\nendif\ny = x.to_string()\n");
    assert_eq!(var(&a, "y"), "str");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_unknown_receiver_reports_nothing() {
    let a = analyze("x = [].get(0)\ny = x.whatever()\n");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_element_aware_methods() {
    let a = analyze("l = ['a']\ne = l.get(0)\nd = {'k': 1}\nv = d.get('k', 'x')\nks = d.keys()\n");
    assert_eq!(var(&a, "e"), "str");
    assert_eq!(var(&a, "v"), "int|str");
    assert_eq!(var(&a, "ks"), "list(str)");
}

#[test]
fn test_import() {
    let a = analyze("fs = import('fs')\nok = fs.exists('a')\n");
    assert_eq!(var(&a, "fs"), "fs_module");
    assert_eq!(var(&a, "ok"), "bool");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));

    let a = analyze("q = import('qt9')\n");
    assert_eq!(var(&a, "q"), "module");
    assert_eq!(messages(&a), vec!["Unknown module 'qt9'"]);
    assert_eq!(a.diagnostics()[0].severity, Severity::Warning);
}

#[test]
fn test_get_and_set_variable() {
    let a = analyze("set_variable('v', 1)\nw = get_variable('v')\n");
    assert_eq!(var(&a, "v"), "int");
    assert_eq!(var(&a, "w"), "int");

    let a = analyze("w = get_variable('nope')\n");
    assert_eq!(messages(&a), vec!["Unknown identifier 'nope'"]);

    let a = analyze("w = get_variable('nope', 'fallback')\n");
    assert_eq!(var(&a, "w"), "str");
    assert!(a.diagnostics().is_empty(), "{:?}", messages(&a));
}

#[test]
fn test_subscripts() {
    let a = analyze("g = custom_target('gen', output: ['a.c'])\nsrc = g[0]\nc = 'abc'[1]\nn = [1, 2][0]\n");
    assert_eq!(var(&a, "src"), "custom_idx");
    assert_eq!(var(&a, "c"), "str");
    assert_eq!(var(&a, "n"), "int");
}

#[test]
fn test_format_string_placeholders() {
    let a = analyze("name = 'a'\ns = f'@name@ and @missing@'\n");
    assert_eq!(var(&a, "s"), "str");
    assert_eq!(messages(&a), vec!["Unknown identifier 'missing' in format string"]);
    assert_eq!(format_placeholders("@a@ @1x@ @b_c@"), vec![(1, "a"), (10, "b_c")]);
}

#[test]
fn test_subdir_scope_snapshots() {
    let a = analyze("a = 1\nsubdir('src')\nb = 2\nsubdir('tests')\n");
    assert_eq!(a.subdir_scopes.len(), 2);
    assert_eq!(a.subdir_scopes[0].dir, "src");
    assert!(a.subdir_scopes[0].scope.contains("a"));
    assert!(!a.subdir_scopes[0].scope.contains("b"));
    assert!(a.subdir_scopes[1].scope.contains("b"));

    let dirs: Vec<Option<&str>> = a.metadata.subdir_calls.iter().map(|s| s.dir.as_deref()).collect();
    assert_eq!(dirs, vec![Some("src"), Some("tests")]);
}

#[test]
fn test_subdir_with_computed_name() {
    let a = analyze("d = 'x'\nsubdir(d)\n");
    assert!(a.subdir_scopes.is_empty());
    assert_eq!(a.metadata.subdir_calls[0].dir, None);
    assert_eq!(
        messages(&a),
        vec!["subdir() argument is not a string literal, directory is skipped"]
    );
}

#[test]
fn test_parse_errors_become_diagnostics() {
    let a = analyze("x = 1 +\ny = 1\n");
    assert!(a.metadata.error_count() >= 1);
    assert_eq!(var(&a, "y"), "int");
}

#[test]
fn test_types_of_nodes() {
    let ns = mini_namespace();
    let ast = Ast::parse("x = [1, 'a']\n");
    let a = TypeAnalyzer::new(&ns, &ast, Path::new("meson.build")).analyze(Scope::root(&ns));
    let rhs = ast
        .ids()
        .find_map(|id| match ast.kind(id) {
            NodeKind::AssignmentStatement { rhs, .. } => Some(*rhs),
            _ => None,
        })
        .unwrap();
    assert_eq!(a.types_of(rhs).unwrap().to_string(), "list(int|str)");
}

#[test]
fn test_analysis_is_repeatable() {
    let ns = mini_namespace();
    let src = "x = 1\nif x > 0\n  x = 'a'\nendif\nsubdir('src')\nfoo()\n";
    let ast = Ast::parse(src);
    let first = TypeAnalyzer::new(&ns, &ast, Path::new("meson.build")).analyze(Scope::root(&ns));
    let second = TypeAnalyzer::new(&ns, &ast, Path::new("meson.build")).analyze(Scope::root(&ns));
    assert_eq!(first, second);
}

#[test]
fn test_metadata_lookup_boundaries() {
    let a = analyze("e = meson.version()\n");
    let call = a.metadata.find_method_call_at(0, 18).unwrap();
    assert_eq!(call.name, "version");
    assert!(a.metadata.find_method_call_at(0, 19).is_none());

    let id = a.metadata.find_identifier_at(0, 5).unwrap();
    assert_eq!(id.name, "meson");
    assert_eq!(id.types.to_string(), "meson");

    let assignment = a.metadata.find_assignment_at(0, 0).unwrap();
    assert_eq!(assignment.name, "e");
    assert_eq!(assignment.types.to_string(), "str");
}

#[test]
fn test_kwarg_metadata() {
    let a = analyze("executable('a', install: true)\n");
    let kwarg = a.metadata.find_kwarg_at(0, 18).unwrap();
    assert_eq!(kwarg.name, "install");
    assert_eq!(kwarg.function.as_ref().unwrap().name, "executable");
    assert!(a.metadata.find_full_function_call_at(0, 2).is_some());
}

#[test]
fn test_nesting_limits_keep_analysis_alive() {
    let src = format!(
        "x = {}1{}\ny = {}1\nz = {}true\n",
        "[".repeat(90),
        "]".repeat(90),
        "1 + ".repeat(100),
        "not ".repeat(10_000)
    );
    let a = analyze(&src);
    assert!(var(&a, "x").starts_with("list(list("));
    assert_eq!(var(&a, "y"), "int");
    assert!(a.scope.get("z").is_none());
    assert_eq!(messages(&a).len(), 1);
    assert!(messages(&a)[0].contains("too deep"));
}
