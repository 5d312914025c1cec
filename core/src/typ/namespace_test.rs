#[cfg(test)]
mod tests {
    use crate::typ::test_catalog::mini_namespace;
    use crate::typ::{NamespaceError, Type, TypeNamespace, TypeSet, find_method, methods_of};

    #[test]
    fn lookup_and_ancestry() {
        let ns = mini_namespace();
        let exe = ns.lookup_type("exe").unwrap();
        let chain: Vec<&str> = ns.ancestry(exe.id).map(|o| o.name.as_ref()).collect();
        assert_eq!(chain, vec!["exe", "build_tgt", "tgt"]);

        let tgt = ns.lookup_type("tgt").unwrap();
        assert!(ns.is_subtype(exe.id, tgt.id));
        assert!(!ns.is_subtype(tgt.id, exe.id));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let ns = mini_namespace();
        assert_eq!(
            ns.lookup_type("no_such_object").unwrap_err(),
            NamespaceError::UnknownType("no_such_object".into())
        );
    }

    #[test]
    fn type_expressions() {
        let ns = mini_namespace();
        let set = ns.parse_type_expr("list(str | file) | dict(any) | bool").unwrap();
        assert_eq!(set.to_string(), "bool|list(str|file)|dict(any)");

        assert_eq!(ns.parse_type_expr("list").unwrap().to_string(), "list(any)");
        assert!(ns.parse_type_expr("").unwrap().is_empty());
    }

    #[test]
    fn bad_type_expressions() {
        let ns = mini_namespace();
        assert!(matches!(
            ns.parse_type_expr("list(str"),
            Err(NamespaceError::BadTypeExpr { .. })
        ));
        assert!(matches!(ns.parse_type_expr("str|"), Err(NamespaceError::BadTypeExpr { .. })));
        assert!(matches!(ns.parse_type_expr("int(str)"), Err(NamespaceError::BadTypeExpr { .. })));
        assert_eq!(
            ns.parse_type_expr("str|widget").unwrap_err(),
            NamespaceError::UnknownType("widget".into())
        );
    }

    #[test]
    fn builder_rejects_duplicates() {
        let mut b = TypeNamespace::builder();
        b.object("dep", None).object("dep", None);
        assert_eq!(b.build().unwrap_err(), NamespaceError::DuplicateName("dep".into()));

        let mut b = TypeNamespace::builder();
        b.function("files", "void");
        b.function("files", "void");
        assert_eq!(b.build().unwrap_err(), NamespaceError::DuplicateName("files".into()));

        let mut b = TypeNamespace::builder();
        b.method("str", "strip", "str");
        b.method("str", "strip", "str");
        assert_eq!(b.build().unwrap_err(), NamespaceError::DuplicateName("str.strip".into()));

        let mut b = TypeNamespace::builder();
        b.object("str", None);
        assert!(matches!(b.build(), Err(NamespaceError::DuplicateName(_))));
    }

    #[test]
    fn builder_rejects_unknown_references() {
        let mut b = TypeNamespace::builder();
        b.object("exe", Some("build_tgt"));
        assert_eq!(b.build().unwrap_err(), NamespaceError::UnknownType("build_tgt".into()));

        let mut b = TypeNamespace::builder();
        b.method("widget", "show", "void");
        assert_eq!(b.build().unwrap_err(), NamespaceError::UnknownType("widget".into()));

        let mut b = TypeNamespace::builder();
        b.function("f", "list(widget)");
        assert_eq!(b.build().unwrap_err(), NamespaceError::UnknownType("widget".into()));
    }

    #[test]
    fn builder_rejects_cycles() {
        let mut b = TypeNamespace::builder();
        b.object("a", Some("b")).object("b", Some("a"));
        assert!(matches!(b.build(), Err(NamespaceError::InheritanceCycle(_))));
    }

    #[test]
    fn accepts_rules() {
        let ns = mini_namespace();
        let tgt = ns.object_type("tgt").unwrap();
        let exe = ns.object_type("exe").unwrap();
        let dep = ns.object_type("dep").unwrap();
        let list_str = ns.parse_type_expr("list(str)").unwrap();

        // subtypes pass where a parent is expected
        assert!(ns.accepts(&TypeSet::single(tgt.clone()), &exe));
        assert!(!ns.accepts(&TypeSet::single(exe.clone()), &tgt));
        assert!(!ns.accepts(&TypeSet::single(tgt), &dep));

        // a lone value is accepted where a list of it is
        assert!(ns.accepts(&list_str, &Type::Str));
        assert!(!ns.accepts(&list_str, &Type::Int));
        assert!(ns.accepts(&list_str, &Type::List(TypeSet::new())));

        // lists flatten into a scalar slot
        assert!(ns.accepts(&TypeSet::single(Type::Str), &Type::List(TypeSet::single(Type::Str))));

        assert!(ns.accepts(&TypeSet::any(), &Type::Int));
        assert!(ns.accepts(&TypeSet::single(Type::Int), &Type::Any));
        assert!(ns.accepts(&TypeSet::single(Type::Int), &Type::Disabler));
        assert!(ns.accepts(&TypeSet::new(), &Type::Bool));
    }

    #[test]
    fn accepts_some_and_all() {
        let ns = mini_namespace();
        let str_only = TypeSet::single(Type::Str);
        let mixed: TypeSet = [Type::Int, Type::Str].into_iter().collect();
        assert!(ns.accepts_some(&str_only, &mixed));
        assert!(!ns.accepts_all(&str_only, &mixed));
        assert!(ns.accepts_some(&str_only, &TypeSet::new()));
        assert!(!ns.accepts_some(&str_only, &TypeSet::single(Type::Bool)));
    }

    #[test]
    fn method_lookup_walks_parents() {
        let ns = mini_namespace();
        let exe = ns.object_type("exe").unwrap();
        let full_path = find_method(&ns, &exe, "full_path").unwrap();
        assert_eq!(full_path.id(), "tgt.full_path");
        assert!(find_method(&ns, &exe, "found").is_none());

        let names: Vec<String> = methods_of(&ns, &exe).iter().map(|m| m.id()).collect();
        assert_eq!(names, vec!["build_tgt.name", "tgt.full_path"]);

        let split = find_method(&ns, &Type::Str, "split").unwrap();
        assert_eq!(split.owner.as_deref(), Some("str"));
    }

    #[test]
    fn function_signatures() {
        let ns = mini_namespace();
        let split = ns.method("str", "split").unwrap();
        assert_eq!(split.to_string(), "list(str) str.split(separator?: str)");

        let exe = ns.function("executable").unwrap();
        assert_eq!(exe.min_positional(), 1);
        assert_eq!(exe.max_positional(), None);
        assert_eq!(exe.positional_at(7).unwrap().name, "source");
        assert!(exe.kwarg("install").is_some());
        assert!(exe.kwarg("nope").is_none());

        let range = ns.function("range").unwrap();
        assert_eq!(range.min_positional(), 1);
        assert_eq!(range.max_positional(), Some(3));
        assert!(range.positional_at(3).is_none());
    }

    #[test]
    fn modules_and_globals() {
        let ns = mini_namespace();
        assert_eq!(ns.module("fs").unwrap().name.as_ref(), "fs_module");
        assert!(ns.module("qt9").is_none());
        let globals: Vec<&str> = ns.globals().map(|(name, _)| name).collect();
        assert_eq!(globals, vec!["meson", "build_machine", "host_machine"]);
    }
}
