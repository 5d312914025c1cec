use std::{fmt, sync::Arc};

use super::{ObjectId, ObjectType, Type, TypeSet};
use crate::util::{FastHashMap, fast_hash_map_new};

/// A builtin object type with an optional parent in the inheritance chain.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractObject {
    pub id: ObjectId,
    pub name: Arc<str>,
    pub parent: Option<ObjectId>,
}

impl AbstractObject {
    pub fn as_type(&self) -> Type {
        Type::Object(ObjectType {
            id: self.id,
            name: self.name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionalArgument {
    pub name: String,
    pub types: TypeSet,
    pub optional: bool,
    /// Absorbs every remaining positional argument.
    pub varargs: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kwarg {
    pub name: String,
    pub types: TypeSet,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(PositionalArgument),
    Kwarg(Kwarg),
}

impl Argument {
    pub fn name(&self) -> &str {
        match self {
            Argument::Positional(p) => &p.name,
            Argument::Kwarg(k) => &k.name,
        }
    }

    pub fn types(&self) -> &TypeSet {
        match self {
            Argument::Positional(p) => &p.types,
            Argument::Kwarg(k) => &k.types,
        }
    }

    pub fn optional(&self) -> bool {
        match self {
            Argument::Positional(p) => p.optional,
            Argument::Kwarg(k) => k.optional,
        }
    }
}

/// Signature of a free function or of a method (`owner` set).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Type whose vtable holds this method.
    pub owner: Option<String>,
    pub args: Vec<Argument>,
    pub return_types: TypeSet,
}

pub type Method = Function;

impl Function {
    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }

    pub fn positional(&self) -> impl Iterator<Item = &PositionalArgument> {
        self.args.iter().filter_map(|a| match a {
            Argument::Positional(p) => Some(p),
            Argument::Kwarg(_) => None,
        })
    }

    pub fn kwargs(&self) -> impl Iterator<Item = &Kwarg> {
        self.args.iter().filter_map(|a| match a {
            Argument::Kwarg(k) => Some(k),
            Argument::Positional(_) => None,
        })
    }

    pub fn kwarg(&self, name: &str) -> Option<&Kwarg> {
        self.kwargs().find(|k| k.name == name)
    }

    /// Number of positional arguments a call must supply.
    pub fn min_positional(&self) -> usize {
        self.positional().filter(|p| !p.optional && !p.varargs).count()
    }

    /// Upper bound on positional arguments, `None` with varargs.
    pub fn max_positional(&self) -> Option<usize> {
        if self.positional().any(|p| p.varargs) {
            None
        } else {
            Some(self.positional().count())
        }
    }

    /// Declared positional parameter receiving the argument at `index`.
    pub fn positional_at(&self, index: usize) -> Option<&PositionalArgument> {
        let mut last = None;
        for (i, p) in self.positional().enumerate() {
            if i == index {
                return Some(p);
            }
            last = Some(p);
        }
        last.filter(|p| p.varargs)
    }

    /// Qualified name: `str.split` for methods, the bare name otherwise.
    pub fn id(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Function {
    /// Signature text like `list(str) str.split(separator?: str)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_types, self.id())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                Argument::Positional(p) if p.varargs => write!(f, "{}...: {}", p.name, p.types)?,
                Argument::Positional(p) if p.optional => write!(f, "{}?: {}", p.name, p.types)?,
                Argument::Positional(p) => write!(f, "{}: {}", p.name, p.types)?,
                Argument::Kwarg(k) if k.optional => write!(f, "{}?: {}", k.name, k.types)?,
                Argument::Kwarg(k) => write!(f, "{}: {}", k.name, k.types)?,
            }
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    UnknownType(String),
    DuplicateName(String),
    BadTypeExpr { expr: String, reason: String },
    InheritanceCycle(String),
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceError::UnknownType(name) => write!(f, "Unknown type '{}'", name),
            NamespaceError::DuplicateName(name) => write!(f, "Duplicate definition of '{}'", name),
            NamespaceError::BadTypeExpr { expr, reason } => {
                write!(f, "Invalid type expression '{}': {}", expr, reason)
            }
            NamespaceError::InheritanceCycle(name) => write!(f, "Inheritance cycle through '{}'", name),
        }
    }
}

impl std::error::Error for NamespaceError {}

/// Names that are types without being object types.
const PRIMITIVES: &[&str] = &["any", "bool", "int", "str", "void", "disabler", "list", "dict"];

#[derive(Debug, Default)]
struct Vtable {
    methods: Vec<Arc<Function>>,
    index: FastHashMap<String, usize>,
}

/// Read-only catalog of builtin object types, free functions and methods.
#[derive(Debug)]
pub struct TypeNamespace {
    objects: Vec<AbstractObject>,
    object_index: FastHashMap<String, ObjectId>,
    functions: Vec<Arc<Function>>,
    function_index: FastHashMap<String, usize>,
    vtables: FastHashMap<String, Vtable>,
    modules: FastHashMap<String, ObjectId>,
    globals: Vec<(String, ObjectId)>,
}

impl TypeNamespace {
    pub fn builder() -> NamespaceBuilder {
        NamespaceBuilder::default()
    }

    /// Object type by name.
    pub fn lookup_type(&self, name: &str) -> Result<&AbstractObject, NamespaceError> {
        self.object_index
            .get(name)
            .map(|id| &self.objects[id.index()])
            .ok_or_else(|| NamespaceError::UnknownType(name.to_string()))
    }

    pub fn object(&self, id: ObjectId) -> &AbstractObject {
        &self.objects[id.index()]
    }

    pub fn objects(&self) -> &[AbstractObject] {
        &self.objects
    }

    /// `Type::Object` for a catalog object name.
    pub fn object_type(&self, name: &str) -> Option<Type> {
        self.lookup_type(name).ok().map(AbstractObject::as_type)
    }

    /// Methods declared directly on `type_name`; inherited methods are not included.
    pub fn vtable(&self, type_name: &str) -> &[Arc<Function>] {
        self.vtables.get(type_name).map(|v| v.methods.as_slice()).unwrap_or(&[])
    }

    /// Method declared directly on `type_name`.
    pub fn method(&self, type_name: &str, method: &str) -> Option<&Arc<Function>> {
        let vtable = self.vtables.get(type_name)?;
        vtable.index.get(method).map(|i| &vtable.methods[*i])
    }

    pub fn function(&self, name: &str) -> Option<&Arc<Function>> {
        self.function_index.get(name).map(|i| &self.functions[*i])
    }

    pub fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    /// Object returned by `import(name)`.
    pub fn module(&self, name: &str) -> Option<&AbstractObject> {
        self.modules.get(name).map(|id| self.object(*id))
    }

    /// Variables bound in every root file before analysis starts.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &AbstractObject)> {
        self.globals.iter().map(|(name, id)| (name.as_str(), self.object(*id)))
    }

    /// `id` followed by its parent chain.
    pub fn ancestry(&self, id: ObjectId) -> impl Iterator<Item = &AbstractObject> {
        std::iter::successors(Some(self.object(id)), move |o| o.parent.map(|p| self.object(p)))
    }

    pub fn is_subtype(&self, id: ObjectId, ancestor: ObjectId) -> bool {
        self.ancestry(id).any(|o| o.id == ancestor)
    }

    /// Parse a type expression such as `list(str|file)|dict(any)`.
    pub fn parse_type_expr(&self, expr: &str) -> Result<TypeSet, NamespaceError> {
        TypeExprParser::new(expr, &|name| self.object_type(name)).parse()
    }

    /// Whether a value of type `actual` may be passed where `accepted` is expected.
    ///
    /// An empty `accepted` set places no constraint.
    pub fn accepts(&self, accepted: &TypeSet, actual: &Type) -> bool {
        if accepted.is_empty() || accepted.contains(&Type::Any) || actual.is_any_like() {
            return true;
        }
        let direct = match actual {
            Type::Object(object) => accepted
                .objects()
                .any(|expected| self.is_subtype(object.id, expected.id)),
            Type::List(elements) => {
                // lists are flattened into the surrounding argument
                elements.is_empty()
                    || accepted.iter().any(|a| match a {
                        Type::List(inner) => self.accepts_all(inner, elements),
                        _ => false,
                    })
                    || self.accepts_all(accepted, elements)
            }
            Type::Dict(values) => accepted.iter().any(|a| match a {
                Type::Dict(inner) => values.is_empty() || self.accepts_all(inner, values),
                _ => false,
            }),
            other => accepted.contains(other),
        };
        // a single value is accepted where a list of it is
        direct
            || accepted.iter().any(|a| match a {
                Type::List(inner) if !matches!(actual, Type::List(_)) => {
                    !inner.is_empty() && self.accepts(inner, actual)
                }
                _ => false,
            })
    }

    /// True when every member of `actual` is accepted.
    pub fn accepts_all(&self, accepted: &TypeSet, actual: &TypeSet) -> bool {
        accepted.is_empty() || actual.iter().all(|t| self.accepts(accepted, t))
    }

    /// True when at least one member of `actual` is accepted, or nothing is known about it.
    pub fn accepts_some(&self, accepted: &TypeSet, actual: &TypeSet) -> bool {
        actual.is_empty() || actual.iter().any(|t| self.accepts(accepted, t))
    }
}

struct TypeExprParser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
    resolve: &'a dyn Fn(&str) -> Option<Type>,
}

impl<'a> TypeExprParser<'a> {
    fn new(expr: &'a str, resolve: &'a dyn Fn(&str) -> Option<Type>) -> Self {
        TypeExprParser {
            expr,
            chars: expr.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
            resolve,
        }
    }

    fn bad(&self, reason: impl Into<String>) -> NamespaceError {
        NamespaceError::BadTypeExpr {
            expr: self.expr.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(mut self) -> Result<TypeSet, NamespaceError> {
        if self.chars.is_empty() {
            return Ok(TypeSet::new());
        }
        let set = self.union()?;
        if self.pos != self.chars.len() {
            return Err(self.bad(format!("unexpected '{}'", self.chars[self.pos])));
        }
        Ok(set)
    }

    fn union(&mut self) -> Result<TypeSet, NamespaceError> {
        let mut set = TypeSet::new();
        loop {
            set.insert(self.term()?);
            if self.chars.get(self.pos) != Some(&'|') {
                return Ok(set);
            }
            self.pos += 1;
        }
    }

    fn term(&mut self) -> Result<Type, NamespaceError> {
        let start = self.pos;
        while let Some(c) = self.chars.get(self.pos) {
            if !(c.is_ascii_alphanumeric() || *c == '_') {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.bad("expected a type name"));
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        let inner = if self.chars.get(self.pos) == Some(&'(') {
            self.pos += 1;
            let inner = self.union()?;
            if self.chars.get(self.pos) != Some(&')') {
                return Err(self.bad("missing ')'"));
            }
            self.pos += 1;
            Some(inner)
        } else {
            None
        };
        match (name.as_str(), inner) {
            ("list", inner) => Ok(Type::List(inner.unwrap_or_else(TypeSet::any))),
            ("dict", inner) => Ok(Type::Dict(inner.unwrap_or_else(TypeSet::any))),
            (_, Some(_)) => Err(self.bad(format!("'{}' takes no element type", name))),
            ("any", None) => Ok(Type::Any),
            ("bool", None) => Ok(Type::Bool),
            ("int", None) => Ok(Type::Int),
            ("str", None) => Ok(Type::Str),
            ("void", None) => Ok(Type::Void),
            ("disabler", None) => Ok(Type::Disabler),
            (other, None) => (self.resolve)(other).ok_or_else(|| NamespaceError::UnknownType(other.to_string())),
        }
    }
}

/// Argument declaration in a [`NamespaceBuilder`], types still as text.
#[derive(Debug, Clone)]
enum ArgDecl {
    Positional {
        name: String,
        types: String,
        optional: bool,
        varargs: bool,
    },
    Kwarg {
        name: String,
        types: String,
        optional: bool,
    },
}

/// Function or method declaration under construction.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    name: String,
    owner: Option<String>,
    returns: String,
    args: Vec<ArgDecl>,
}

impl FunctionDecl {
    fn positional(&mut self, name: &str, types: &str, optional: bool, varargs: bool) -> &mut Self {
        self.args.push(ArgDecl::Positional {
            name: name.to_string(),
            types: types.to_string(),
            optional,
            varargs,
        });
        self
    }

    /// Required positional argument.
    pub fn pos(&mut self, name: &str, types: &str) -> &mut Self {
        self.positional(name, types, false, false)
    }

    /// Optional positional argument.
    pub fn opt(&mut self, name: &str, types: &str) -> &mut Self {
        self.positional(name, types, true, false)
    }

    /// Trailing variadic positional argument.
    pub fn varargs(&mut self, name: &str, types: &str) -> &mut Self {
        self.positional(name, types, true, true)
    }

    /// Optional keyword argument.
    pub fn kw(&mut self, name: &str, types: &str) -> &mut Self {
        self.args.push(ArgDecl::Kwarg {
            name: name.to_string(),
            types: types.to_string(),
            optional: true,
        });
        self
    }

    /// Keyword argument every call must pass.
    pub fn req_kw(&mut self, name: &str, types: &str) -> &mut Self {
        self.args.push(ArgDecl::Kwarg {
            name: name.to_string(),
            types: types.to_string(),
            optional: false,
        });
        self
    }

    /// Several optional keyword arguments sharing one type.
    pub fn kws(&mut self, names: &[&str], types: &str) -> &mut Self {
        for name in names {
            self.kw(name, types);
        }
        self
    }
}

/// Collects catalog declarations; [`NamespaceBuilder::build`] validates them.
#[derive(Debug, Default)]
pub struct NamespaceBuilder {
    objects: Vec<(String, Option<String>)>,
    functions: Vec<FunctionDecl>,
    modules: Vec<(String, String)>,
    globals: Vec<(String, String)>,
}

impl NamespaceBuilder {
    pub fn object(&mut self, name: &str, parent: Option<&str>) -> &mut Self {
        self.objects.push((name.to_string(), parent.map(str::to_string)));
        self
    }

    pub fn function(&mut self, name: &str, returns: &str) -> &mut FunctionDecl {
        self.functions.push(FunctionDecl {
            name: name.to_string(),
            owner: None,
            returns: returns.to_string(),
            args: Vec::new(),
        });
        let last = self.functions.len() - 1;
        &mut self.functions[last]
    }

    pub fn method(&mut self, owner: &str, name: &str, returns: &str) -> &mut FunctionDecl {
        self.functions.push(FunctionDecl {
            name: name.to_string(),
            owner: Some(owner.to_string()),
            returns: returns.to_string(),
            args: Vec::new(),
        });
        let last = self.functions.len() - 1;
        &mut self.functions[last]
    }

    /// `import(name)` yields an object of type `object`.
    pub fn module(&mut self, name: &str, object: &str) -> &mut Self {
        self.modules.push((name.to_string(), object.to_string()));
        self
    }

    pub fn global(&mut self, name: &str, object: &str) -> &mut Self {
        self.globals.push((name.to_string(), object.to_string()));
        self
    }

    pub fn build(&self) -> Result<TypeNamespace, NamespaceError> {
        let mut ns = TypeNamespace {
            objects: Vec::with_capacity(self.objects.len()),
            object_index: fast_hash_map_new(),
            functions: Vec::new(),
            function_index: fast_hash_map_new(),
            vtables: fast_hash_map_new(),
            modules: fast_hash_map_new(),
            globals: Vec::new(),
        };

        for (i, (name, _)) in self.objects.iter().enumerate() {
            if PRIMITIVES.contains(&name.as_str()) || ns.object_index.contains_key(name) {
                return Err(NamespaceError::DuplicateName(name.clone()));
            }
            let id = ObjectId(i as u32);
            ns.object_index.insert(name.clone(), id);
            ns.objects.push(AbstractObject {
                id,
                name: Arc::from(name.as_str()),
                parent: None,
            });
        }
        for (i, (_, parent)) in self.objects.iter().enumerate() {
            if let Some(parent) = parent {
                let parent_id = ns.lookup_type(parent)?.id;
                ns.objects[i].parent = Some(parent_id);
            }
        }
        for object in &ns.objects {
            let mut seen = 0;
            let mut cursor = object.parent;
            while let Some(p) = cursor {
                seen += 1;
                if p == object.id || seen > ns.objects.len() {
                    return Err(NamespaceError::InheritanceCycle(object.name.to_string()));
                }
                cursor = ns.objects[p.index()].parent;
            }
        }

        for decl in &self.functions {
            let function = Arc::new(self.resolve_function(&ns, decl)?);
            match &decl.owner {
                None => {
                    if ns.function_index.contains_key(&decl.name) {
                        return Err(NamespaceError::DuplicateName(decl.name.clone()));
                    }
                    ns.function_index.insert(decl.name.clone(), ns.functions.len());
                    ns.functions.push(function);
                }
                Some(owner) => {
                    if !PRIMITIVES.contains(&owner.as_str()) {
                        ns.lookup_type(owner)?;
                    }
                    let vtable = ns.vtables.entry(owner.clone()).or_default();
                    if vtable.index.contains_key(&decl.name) {
                        return Err(NamespaceError::DuplicateName(function.id()));
                    }
                    vtable.index.insert(decl.name.clone(), vtable.methods.len());
                    vtable.methods.push(function);
                }
            }
        }

        for (name, object) in &self.modules {
            let id = ns.lookup_type(object)?.id;
            if ns.modules.insert(name.clone(), id).is_some() {
                return Err(NamespaceError::DuplicateName(name.clone()));
            }
        }
        for (name, object) in &self.globals {
            let id = ns.lookup_type(object)?.id;
            ns.globals.push((name.clone(), id));
        }
        Ok(ns)
    }

    fn resolve_function(&self, ns: &TypeNamespace, decl: &FunctionDecl) -> Result<Function, NamespaceError> {
        let mut args = Vec::with_capacity(decl.args.len());
        for arg in &decl.args {
            args.push(match arg {
                ArgDecl::Positional {
                    name,
                    types,
                    optional,
                    varargs,
                } => Argument::Positional(PositionalArgument {
                    name: name.clone(),
                    types: ns.parse_type_expr(types)?,
                    optional: *optional,
                    varargs: *varargs,
                }),
                ArgDecl::Kwarg { name, types, optional } => Argument::Kwarg(Kwarg {
                    name: name.clone(),
                    types: ns.parse_type_expr(types)?,
                    optional: *optional,
                }),
            });
        }
        Ok(Function {
            name: decl.name.clone(),
            owner: decl.owner.clone(),
            args,
            return_types: ns.parse_type_expr(&decl.returns)?,
        })
    }
}
