use std::{cmp::Ordering, fmt, hash::Hash, sync::Arc};

/// Index of a builtin object type in its [`TypeNamespace`](super::TypeNamespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reference to a builtin object type. Equality and ordering use the id only.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub id: ObjectId,
    pub name: Arc<str>,
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ObjectType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// A Meson value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Any,
    Bool,
    Int,
    Str,
    Void,
    Disabler,
    List(TypeSet),
    Dict(TypeSet),
    Object(ObjectType),
}

impl Type {
    pub fn list_of(elements: TypeSet) -> Type {
        Type::List(elements)
    }

    pub fn dict_of(values: TypeSet) -> Type {
        Type::Dict(values)
    }

    /// Types that silently satisfy every check.
    pub fn is_any_like(&self) -> bool {
        matches!(self, Type::Any | Type::Disabler)
    }

    /// Key of the method table for values of this type.
    pub fn vtable_name(&self) -> Option<&str> {
        match self {
            Type::Bool => Some("bool"),
            Type::Int => Some("int"),
            Type::Str => Some("str"),
            Type::List(_) => Some("list"),
            Type::Dict(_) => Some("dict"),
            Type::Object(o) => Some(o.name.as_ref()),
            Type::Any | Type::Void | Type::Disabler => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Str => f.write_str("str"),
            Type::Void => f.write_str("void"),
            Type::Disabler => f.write_str("disabler"),
            Type::List(inner) if inner.is_empty() => f.write_str("list"),
            Type::List(inner) => write!(f, "list({})", inner),
            Type::Dict(inner) if inner.is_empty() => f.write_str("dict"),
            Type::Dict(inner) => write!(f, "dict({})", inner),
            Type::Object(o) => f.write_str(&o.name),
        }
    }
}

/// Set of possible types of a value.
///
/// Kept sorted and deduplicated. All lists in a set collapse into a single
/// `list(...)` whose element set is the union, likewise for dicts, so equal
/// sets always compare and print the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeSet(Vec<Type>);

impl TypeSet {
    pub fn new() -> Self {
        TypeSet(Vec::new())
    }

    pub fn single(ty: Type) -> Self {
        let mut set = TypeSet::new();
        set.insert(ty);
        set
    }

    pub fn any() -> Self {
        TypeSet::single(Type::Any)
    }

    pub fn insert(&mut self, ty: Type) {
        match ty {
            Type::List(inner) => {
                for existing in &mut self.0 {
                    if let Type::List(elements) = existing {
                        elements.union_with(&inner);
                        return;
                    }
                }
                self.push_sorted(Type::List(inner));
            }
            Type::Dict(inner) => {
                for existing in &mut self.0 {
                    if let Type::Dict(values) = existing {
                        values.union_with(&inner);
                        return;
                    }
                }
                self.push_sorted(Type::Dict(inner));
            }
            other => self.push_sorted(other),
        }
    }

    fn push_sorted(&mut self, ty: Type) {
        if let Err(pos) = self.0.binary_search(&ty) {
            self.0.insert(pos, ty);
        }
    }

    pub fn union_with(&mut self, other: &TypeSet) {
        for ty in &other.0 {
            self.insert(ty.clone());
        }
    }

    pub fn union(&self, other: &TypeSet) -> TypeSet {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.0.binary_search(ty).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.0.iter()
    }

    /// True when any member is `any` or `disabler`.
    pub fn has_any_like(&self) -> bool {
        self.0.iter().any(Type::is_any_like)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.0.iter().filter_map(Type::as_object)
    }

    /// Union of the element types of every list in the set.
    pub fn list_elements(&self) -> TypeSet {
        self.0
            .iter()
            .filter_map(|t| match t {
                Type::List(inner) => Some(inner.clone()),
                _ => None,
            })
            .fold(TypeSet::new(), |acc, inner| acc.union(&inner))
    }

    /// Union of the value types of every dict in the set.
    pub fn dict_values(&self) -> TypeSet {
        self.0
            .iter()
            .filter_map(|t| match t {
                Type::Dict(inner) => Some(inner.clone()),
                _ => None,
            })
            .fold(TypeSet::new(), |acc, inner| acc.union(&inner))
    }
}

impl FromIterator<Type> for TypeSet {
    fn from_iter<I: IntoIterator<Item = Type>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for ty in iter {
            set.insert(ty);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Type> for TypeSet {
    fn from(ty: Type) -> Self {
        TypeSet::single(ty)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", ty)?;
        }
        Ok(())
    }
}
