//! Process-wide registry of user-defined types.
//!
//! Holds struct, union and enum definitions plus type aliases, builds values
//! of those types, and coerces values to declared types.

use crate::env::Frame;
use crate::error::{EvalError, EvalResult};
use crate::value::{
    dict_insert, set_insert, ActiveField, Closure, EnumValue, Member, StructValue, UnionGroup,
    UnionValue, Value,
};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use zyra_types::ast::{
    EnumDecl, Expr, FieldDecl, LambdaBody, StructDecl, StructMember, TypeAliasDecl,
    TypeAnnotation, TypeKind, UnionDecl, VariantDecl,
};

/// What construction needs from the evaluator.
pub trait FieldContext {
    /// Evaluate a field default in the frame the type was declared in.
    fn eval_default(&mut self, default: &Expr, scope: &Frame) -> EvalResult<Value>;
    fn coerce(&self, ty: &TypeAnnotation, value: Value) -> EvalResult<Value>;
}

// ══════════════════════════════════════════════════════════════════════════════
// Definitions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum MemberDef {
    Field(FieldDecl),
    /// Anonymous union: exactly one of these fields is active.
    Group(Rc<[String]>, Vec<FieldDecl>),
}

#[derive(Debug)]
pub enum TypeDef {
    Struct {
        members: Vec<MemberDef>,
        methods: HashMap<String, Rc<Closure>>,
    },
    Union {
        fields: Vec<FieldDecl>,
    },
    Enum {
        variants: Vec<VariantDecl>,
    },
}

#[derive(Debug)]
pub struct TypeEntry {
    pub name: String,
    pub def: TypeDef,
    /// Frame the declaration was evaluated in; field defaults run here.
    pub scope: Frame,
}

fn coerce_field(
    ctx: &dyn FieldContext,
    decl: &FieldDecl,
    value: Value,
) -> EvalResult<Value> {
    match &decl.type_ann {
        Some(ty) => ctx.coerce(ty, value),
        None => Ok(value),
    }
}

impl TypeEntry {
    pub fn kind_name(&self) -> &'static str {
        match self.def {
            TypeDef::Struct { .. } => "struct",
            TypeDef::Union { .. } => "union",
            TypeDef::Enum { .. } => "enum",
        }
    }

    /// Declaration of a struct or union field, including union-group fields.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        match &self.def {
            TypeDef::Struct { members, .. } => members.iter().find_map(|m| match m {
                MemberDef::Field(f) if f.name.name == name => Some(f),
                MemberDef::Group(_, fields) => fields.iter().find(|f| f.name.name == name),
                _ => None,
            }),
            TypeDef::Union { fields } => fields.iter().find(|f| f.name.name == name),
            TypeDef::Enum { .. } => None,
        }
    }

    pub fn method(&self, name: &str) -> Option<Rc<Closure>> {
        match &self.def {
            TypeDef::Struct { methods, .. } => methods.get(name).cloned(),
            _ => None,
        }
    }

    /// Build a struct or union from `Name { field: value, ... }`.
    pub fn construct(
        &self,
        supplied: Vec<(String, Value)>,
        ctx: &mut dyn FieldContext,
    ) -> EvalResult<Value> {
        match &self.def {
            TypeDef::Struct { members, .. } => self.construct_struct(members, supplied, ctx),
            TypeDef::Union { fields } => self.construct_union(fields, supplied, &*ctx),
            TypeDef::Enum { .. } => Err(EvalError::TypeMismatch(format!(
                "enum '{}' is built with '{}::Variant', not a field literal",
                self.name, self.name
            ))),
        }
    }

    fn construct_struct(
        &self,
        members: &[MemberDef],
        supplied: Vec<(String, Value)>,
        ctx: &mut dyn FieldContext,
    ) -> EvalResult<Value> {
        let mut given: HashMap<String, Value> = HashMap::new();
        for (name, value) in supplied {
            if self.field(&name).is_none() {
                return Err(EvalError::UnknownMember(format!(
                    "'{}' has no field '{name}'",
                    self.name
                )));
            }
            if given.insert(name.clone(), value).is_some() {
                return Err(EvalError::DuplicateDefinition(format!(
                    "field '{name}' given twice in '{}' literal",
                    self.name
                )));
            }
        }

        let mut built = Vec::with_capacity(members.len());
        for member in members {
            match member {
                MemberDef::Field(decl) => {
                    let value = match given.remove(&decl.name.name) {
                        Some(v) => v,
                        None => self.default_of(decl, decl.name.name.clone(), ctx)?,
                    };
                    let value = coerce_field(&*ctx, decl, value)?;
                    built.push(Member::Field(decl.name.name.clone(), value));
                }
                MemberDef::Group(names, decls) => {
                    let chosen: Vec<&FieldDecl> = decls
                        .iter()
                        .filter(|d| given.contains_key(&d.name.name))
                        .collect();
                    let (decl, value) = match chosen.as_slice() {
                        [] => {
                            let decl = decls.iter().find(|d| d.default.is_some()).ok_or_else(
                                || EvalError::MissingField {
                                    type_name: self.name.clone(),
                                    field: names.join(" | "),
                                },
                            )?;
                            (decl, self.default_of(decl, names.join(" | "), ctx)?)
                        }
                        [decl] => {
                            let value = given.remove(&decl.name.name).unwrap_or(Value::Null);
                            (*decl, value)
                        }
                        many => {
                            let listed: Vec<&str> =
                                many.iter().map(|d| d.name.name.as_str()).collect();
                            return Err(EvalError::InvalidUnionConstruction(format!(
                                "'{}' literal sets {} of the same union; exactly one is allowed",
                                self.name,
                                listed.join(" and ")
                            )));
                        }
                    };
                    let value = coerce_field(&*ctx, decl, value)?;
                    built.push(Member::Group(UnionGroup {
                        fields: Rc::clone(names),
                        active: ActiveField::new(decl.name.name.clone(), value),
                    }));
                }
            }
        }

        Ok(Value::Struct(StructValue {
            type_name: self.name.clone(),
            members: built,
        }))
    }

    fn default_of(
        &self,
        decl: &FieldDecl,
        missing: String,
        ctx: &mut dyn FieldContext,
    ) -> EvalResult<Value> {
        match &decl.default {
            Some(expr) => ctx.eval_default(expr, &self.scope),
            None => Err(EvalError::MissingField {
                type_name: self.name.clone(),
                field: missing,
            }),
        }
    }

    fn construct_union(
        &self,
        fields: &[FieldDecl],
        supplied: Vec<(String, Value)>,
        ctx: &dyn FieldContext,
    ) -> EvalResult<Value> {
        let mut supplied = supplied;
        if supplied.len() != 1 {
            let keys: Vec<&str> = supplied.iter().map(|(k, _)| k.as_str()).collect();
            return Err(EvalError::InvalidUnionConstruction(format!(
                "union '{}' needs exactly one field, got {} ({})",
                self.name,
                supplied.len(),
                keys.join(", ")
            )));
        }
        let (name, value) = supplied.remove(0);
        let decl = fields.iter().find(|f| f.name.name == name).ok_or_else(|| {
            EvalError::InvalidUnionConstruction(format!(
                "union '{}' has no field '{name}'",
                self.name
            ))
        })?;
        let value = coerce_field(ctx, decl, value)?;
        Ok(Value::Union(UnionValue {
            type_name: self.name.clone(),
            active: ActiveField::new(name, value),
        }))
    }

    /// Build `Enum::Variant(args...)`.
    pub fn construct_variant(
        &self,
        variant: &str,
        args: Vec<Value>,
        ctx: &dyn FieldContext,
    ) -> EvalResult<Value> {
        let TypeDef::Enum { variants } = &self.def else {
            return Err(EvalError::TypeMismatch(format!(
                "'{}' is a {}, not an enum",
                self.name,
                self.kind_name()
            )));
        };
        let decl = variants
            .iter()
            .find(|v| v.name.name == variant)
            .ok_or_else(|| {
                EvalError::UnknownMember(format!("enum '{}' has no variant '{variant}'", self.name))
            })?;
        if args.len() != decl.arity() {
            return Err(EvalError::ArityMismatch(format!(
                "{}::{variant} takes {} value(s), got {}",
                self.name,
                decl.arity(),
                args.len()
            )));
        }
        let payload = decl
            .payload
            .iter()
            .zip(args)
            .map(|(ty, value)| ctx.coerce(ty, value))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(Value::Enum(EnumValue {
            type_name: self.name.clone(),
            variant: variant.to_string(),
            payload,
        }))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Registry
// ══════════════════════════════════════════════════════════════════════════════

/// Cloning is cheap: entries are shared, so a clone serves as a snapshot.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, Rc<TypeEntry>>,
    aliases: HashMap<String, TypeAnnotation>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> EvalResult<Rc<TypeEntry>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedName(format!("type '{name}'")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name) || self.aliases.contains_key(name)
    }

    /// All registered type and alias names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn check_free(&self, name: &str) -> EvalResult<()> {
        if self.contains(name) {
            return Err(EvalError::DuplicateDefinition(format!(
                "type '{name}' is already defined"
            )));
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, def: TypeDef, scope: &Frame) {
        let entry = TypeEntry {
            name: name.to_string(),
            def,
            scope: scope.clone(),
        };
        tracing::debug!(name, kind = entry.kind_name(), "registered type");
        self.entries.insert(name.to_string(), Rc::new(entry));
    }

    pub fn define_struct(&mut self, decl: &StructDecl, scope: &Frame) -> EvalResult<()> {
        let name = decl.name.name.as_str();
        self.check_free(name)?;

        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(decl.members.len());
        for member in &decl.members {
            let fields: Vec<&FieldDecl> = match member {
                StructMember::Field(f) => vec![f],
                StructMember::Union(fs) => fs.iter().collect(),
            };
            for f in &fields {
                if !seen.insert(f.name.name.clone()) {
                    return Err(EvalError::DuplicateDefinition(format!(
                        "field '{}' declared twice in struct '{name}'",
                        f.name.name
                    )));
                }
            }
            members.push(match member {
                StructMember::Field(f) => MemberDef::Field(f.clone()),
                StructMember::Union(fs) => {
                    if fs.is_empty() {
                        return Err(EvalError::InvalidUnionConstruction(format!(
                            "empty union in struct '{name}'"
                        )));
                    }
                    let names: Vec<String> = fs.iter().map(|f| f.name.name.clone()).collect();
                    MemberDef::Group(Rc::from(names), fs.clone())
                }
            });
        }

        let mut methods = HashMap::new();
        for method in &decl.methods {
            let closure = Closure {
                name: Some(format!("{name}.{}", method.name.name)),
                params: method.params.clone(),
                return_type: method.return_type.clone(),
                body: LambdaBody::Block(method.body.clone()),
                env: scope.clone(),
                is_async: method.is_async,
            };
            if methods
                .insert(method.name.name.clone(), Rc::new(closure))
                .is_some()
            {
                return Err(EvalError::DuplicateDefinition(format!(
                    "method '{}' declared twice in struct '{name}'",
                    method.name.name
                )));
            }
        }

        self.insert(name, TypeDef::Struct { members, methods }, scope);
        Ok(())
    }

    pub fn define_union(&mut self, decl: &UnionDecl, scope: &Frame) -> EvalResult<()> {
        let name = decl.name.name.as_str();
        self.check_free(name)?;
        let mut seen = HashSet::new();
        for f in &decl.fields {
            if !seen.insert(f.name.name.as_str()) {
                return Err(EvalError::DuplicateDefinition(format!(
                    "field '{}' declared twice in union '{name}'",
                    f.name.name
                )));
            }
        }
        self.insert(
            name,
            TypeDef::Union {
                fields: decl.fields.clone(),
            },
            scope,
        );
        Ok(())
    }

    pub fn define_enum(&mut self, decl: &EnumDecl, scope: &Frame) -> EvalResult<()> {
        let name = decl.name.name.as_str();
        self.check_free(name)?;
        let mut seen = HashSet::new();
        for v in &decl.variants {
            if !seen.insert(v.name.name.as_str()) {
                return Err(EvalError::DuplicateDefinition(format!(
                    "variant '{}' declared twice in enum '{name}'",
                    v.name.name
                )));
            }
        }
        self.insert(
            name,
            TypeDef::Enum {
                variants: decl.variants.clone(),
            },
            scope,
        );
        Ok(())
    }

    /// The target must already resolve, so aliases can never form a cycle.
    pub fn define_alias(&mut self, decl: &TypeAliasDecl) -> EvalResult<()> {
        let name = decl.name.name.as_str();
        self.check_free(name)?;
        self.check_resolvable(&decl.target)?;
        tracing::debug!(name, "registered type alias");
        self.aliases.insert(name.to_string(), decl.target.clone());
        Ok(())
    }

    fn check_resolvable(&self, ty: &TypeAnnotation) -> EvalResult<()> {
        match &ty.kind {
            TypeKind::Named(n) if !self.contains(n) => {
                Err(EvalError::UndefinedName(format!("type '{n}'")))
            }
            TypeKind::Array(inner) | TypeKind::Set(inner) => self.check_resolvable(inner),
            TypeKind::Dict(k, v) => {
                self.check_resolvable(k)?;
                self.check_resolvable(v)
            }
            TypeKind::Tuple(items) => items.iter().try_for_each(|t| self.check_resolvable(t)),
            _ => Ok(()),
        }
    }

    /// Follow aliases to a non-alias annotation.
    pub fn resolve<'a>(&'a self, ty: &'a TypeAnnotation) -> &'a TypeAnnotation {
        let mut current = ty;
        while let TypeKind::Named(n) = &current.kind {
            match self.aliases.get(n) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    // ── Coercion ──────────────────────────────────────────────────────────

    /// Convert `value` to the declared type `ty`.
    ///
    /// Integers are wrapped into a declared integer type and widened into
    /// bigint, float or decimal types. Aggregates are coerced element-wise.
    /// Anything else must already have the declared type.
    pub fn coerce(&self, ty: &TypeAnnotation, value: Value) -> EvalResult<Value> {
        let ty = self.resolve(ty);
        let mismatch = |value: &Value| {
            EvalError::TypeMismatch(format!(
                "expected {}, found {} ({value})",
                type_label(&ty.kind),
                value.type_name()
            ))
        };
        match (&ty.kind, value) {
            (TypeKind::Any, v) => Ok(v),
            (TypeKind::Null, Value::Null) => Ok(Value::Null),
            (TypeKind::Bool, v @ Value::Bool(_)) => Ok(v),
            (TypeKind::Char, v @ Value::Char(_)) => Ok(v),
            (TypeKind::String, v @ Value::String(_)) => Ok(v),
            (TypeKind::Int(t), Value::Int(n, _) | Value::BigInt(n)) => Ok(Value::int(n, *t)),
            (TypeKind::BigInt, Value::Int(n, _) | Value::BigInt(n)) => Ok(Value::BigInt(n)),
            (TypeKind::Float32, Value::Float32(x)) => Ok(Value::Float32(x)),
            (TypeKind::Float32, v @ (Value::Float64(_) | Value::Int(..) | Value::BigInt(_))) => {
                Ok(Value::Float32(crate::arith::to_f64(&v)? as f32))
            }
            (
                TypeKind::Float64,
                v @ (Value::Float32(_) | Value::Float64(_) | Value::Int(..) | Value::BigInt(_)),
            ) => Ok(Value::Float64(crate::arith::to_f64(&v)?)),
            (TypeKind::Decimal, v @ (Value::Decimal(_) | Value::Int(..) | Value::BigInt(_))) => {
                Ok(Value::Decimal(crate::arith::to_decimal(&v)?))
            }
            (TypeKind::Array(elem), Value::Array(items)) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|v| self.coerce(elem, v))
                    .collect::<EvalResult<_>>()?,
            )),
            (TypeKind::Tuple(types), Value::Tuple(items)) if types.len() == items.len() => {
                Ok(Value::Tuple(
                    types
                        .iter()
                        .zip(items)
                        .map(|(t, v)| self.coerce(t, v))
                        .collect::<EvalResult<_>>()?,
                ))
            }
            (TypeKind::Dict(kt, vt), Value::Dict(entries)) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    dict_insert(&mut out, self.coerce(kt, k)?, self.coerce(vt, v)?);
                }
                Ok(Value::Dict(out))
            }
            (TypeKind::Set(elem), Value::Set(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for v in items {
                    set_insert(&mut out, self.coerce(elem, v)?);
                }
                Ok(Value::Set(out))
            }
            (TypeKind::Range, v @ Value::Range(_)) => Ok(v),
            (TypeKind::Function, v) if v.is_callable() => Ok(v),
            (TypeKind::Named(n), v) => {
                if !self.entries.contains_key(n) {
                    return Err(EvalError::UndefinedName(format!("type '{n}'")));
                }
                let matches = matches!(
                    &v,
                    Value::Struct(StructValue { type_name, .. })
                        | Value::Union(UnionValue { type_name, .. })
                        | Value::Enum(EnumValue { type_name, .. })
                        if type_name == n
                );
                if matches {
                    Ok(v)
                } else {
                    Err(mismatch(&v))
                }
            }
            (_, v) => Err(mismatch(&v)),
        }
    }
}

/// Source-like rendering of a type annotation for messages.
pub fn type_label(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Any => "any".into(),
        TypeKind::Null => "null".into(),
        TypeKind::Bool => "bool".into(),
        TypeKind::Char => "char".into(),
        TypeKind::String => "string".into(),
        TypeKind::Int(t) => t.name().into(),
        TypeKind::BigInt => "bigint".into(),
        TypeKind::Float32 => "float32".into(),
        TypeKind::Float64 => "float64".into(),
        TypeKind::Decimal => "decimal".into(),
        TypeKind::Array(t) => format!("array<{}>", type_label(&t.kind)),
        TypeKind::Tuple(ts) => {
            let parts: Vec<String> = ts.iter().map(|t| type_label(&t.kind)).collect();
            format!("({})", parts.join(", "))
        }
        TypeKind::Dict(k, v) => format!("dict<{}, {}>", type_label(&k.kind), type_label(&v.kind)),
        TypeKind::Set(t) => format!("set<{}>", type_label(&t.kind)),
        TypeKind::Range => "range".into(),
        TypeKind::Function => "function".into(),
        TypeKind::Named(n) => n.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use zyra_types::ast::{ExprKind, Stmt};
    use zyra_types::build::*;
    use zyra_types::IntType;

    /// Evaluates literal defaults only; enough for construction tests.
    struct Literals<'a>(&'a TypeRegistry);

    impl FieldContext for Literals<'_> {
        fn eval_default(&mut self, default: &Expr, _scope: &Frame) -> EvalResult<Value> {
            match &default.kind {
                ExprKind::Literal(lit) => Value::from_literal(lit),
                _ => Ok(Value::Null),
            }
        }

        fn coerce(&self, ty: &TypeAnnotation, value: Value) -> EvalResult<Value> {
            self.0.coerce(ty, value)
        }
    }

    fn registry_with(stmt: Stmt) -> TypeRegistry {
        let mut reg = TypeRegistry::new();
        let scope = Frame::root();
        match stmt {
            Stmt::Struct(d) => reg.define_struct(&d, &scope).unwrap(),
            Stmt::Union(d) => reg.define_union(&d, &scope).unwrap(),
            Stmt::Enum(d) => reg.define_enum(&d, &scope).unwrap(),
            _ => unreachable!(),
        }
        reg
    }

    fn rect() -> TypeRegistry {
        registry_with(struct_decl(
            "Rect",
            vec![
                StructMember::Field(field("w", "int32", None)),
                StructMember::Field(field("h", "int32", Some(int(1)))),
            ],
            vec![],
        ))
    }

    #[test]
    fn test_struct_defaults_fill_missing_fields() {
        let reg = rect();
        let entry = reg.get("Rect").unwrap();
        let v = entry
            .construct(vec![("w".into(), Value::from(4))], &mut Literals(&reg))
            .unwrap();
        assert_eq!(v.to_string(), "Rect { w: 4, h: 1 }");
    }

    #[test]
    fn test_struct_missing_field() {
        let reg = rect();
        let entry = reg.get("Rect").unwrap();
        let err = entry.construct(vec![], &mut Literals(&reg)).unwrap_err();
        assert!(matches!(err, EvalError::MissingField { ref field, .. } if field == "w"));
    }

    #[test]
    fn test_struct_unknown_field() {
        let reg = rect();
        let entry = reg.get("Rect").unwrap();
        let err = entry
            .construct(
                vec![("w".into(), Value::from(1)), ("depth".into(), Value::from(2))],
                &mut Literals(&reg),
            )
            .unwrap_err();
        assert!(matches!(err, EvalError::UnknownMember(_)));
    }

    #[test]
    fn test_union_requires_exactly_one_field() {
        let reg = registry_with(union_decl(
            "Num",
            vec![field("i", "int32", None), field("f", "float32", None)],
        ));
        let entry = reg.get("Num").unwrap();
        let ok = entry
            .construct(vec![("i".into(), Value::from(42))], &mut Literals(&reg))
            .unwrap();
        assert_eq!(ok.to_string(), "Num { i: 42 }");

        let none = entry.construct(vec![], &mut Literals(&reg)).unwrap_err();
        assert!(matches!(none, EvalError::InvalidUnionConstruction(_)));
        let two = entry
            .construct(
                vec![("i".into(), Value::from(1)), ("f".into(), Value::Float64(1.0))],
                &mut Literals(&reg),
            )
            .unwrap_err();
        assert!(matches!(two, EvalError::InvalidUnionConstruction(_)));
    }

    #[test]
    fn test_anonymous_union_group() {
        let reg = registry_with(struct_decl(
            "Cell",
            vec![
                StructMember::Field(field("tag", "string", None)),
                StructMember::Union(vec![
                    field("i", "int32", Some(int(0))),
                    field("f", "float32", None),
                ]),
            ],
            vec![],
        ));
        let entry = reg.get("Cell").unwrap();
        let v = entry
            .construct(vec![("tag".into(), Value::from("t"))], &mut Literals(&reg))
            .unwrap();
        assert_eq!(v.to_string(), r#"Cell { tag: "t", i: 0 }"#);

        let err = entry
            .construct(
                vec![
                    ("tag".into(), Value::from("t")),
                    ("i".into(), Value::from(1)),
                    ("f".into(), Value::Float64(2.0)),
                ],
                &mut Literals(&reg),
            )
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidUnionConstruction(_)));
    }

    #[test]
    fn test_enum_variants() {
        let reg = registry_with(enum_decl(
            "Shape",
            vec![("Circle", vec!["float64"]), ("Empty", vec![])],
        ));
        let entry = reg.get("Shape").unwrap();
        let v = entry
            .construct_variant("Circle", vec![Value::from(2)], &Literals(&reg))
            .unwrap();
        assert_eq!(v.to_string(), "Shape::Circle(2.0)");
        assert!(matches!(
            entry.construct_variant("Circle", vec![], &Literals(&reg)),
            Err(EvalError::ArityMismatch(_))
        ));
        assert!(matches!(
            entry.construct_variant("Square", vec![], &Literals(&reg)),
            Err(EvalError::UnknownMember(_))
        ));
    }

    #[test]
    fn test_duplicate_type_name() {
        let mut reg = rect();
        let again = match struct_decl("Rect", vec![], vec![]) {
            Stmt::Struct(d) => d,
            _ => unreachable!(),
        };
        assert!(matches!(
            reg.define_struct(&again, &Frame::root()),
            Err(EvalError::DuplicateDefinition(_))
        ));
    }

    #[test]
    fn test_coerce_wraps_and_widens() {
        let reg = TypeRegistry::new();
        let v = reg.coerce(&ty("uint8"), Value::from(300)).unwrap();
        assert_eq!(v, Value::int(300.into(), IntType::U8));
        assert_eq!(v.type_name(), "uint8");
        let v = reg.coerce(&ty("float64"), Value::from(3)).unwrap();
        assert_eq!(v.type_name(), "float64");
        let err = reg.coerce(&ty("int32"), Value::from("3")).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_alias_resolution() {
        let mut reg = TypeRegistry::new();
        if let Stmt::TypeAlias(a) = type_alias("Id", "uint16") {
            reg.define_alias(&a).unwrap();
        }
        let v = reg.coerce(&ty("Id"), Value::from(65537)).unwrap();
        assert_eq!(v.type_name(), "uint16");
        assert_eq!(v, Value::from(1));

        if let Stmt::TypeAlias(a) = type_alias("Bad", "Nope") {
            assert!(matches!(reg.define_alias(&a), Err(EvalError::UndefinedName(_))));
        }
    }

    #[test]
    fn test_coerce_set_deduplicates_after_wrap() {
        let reg = TypeRegistry::new();
        let set_ty = ty_kind(TypeKind::Set(Box::new(ty("uint8"))));
        let v = reg
            .coerce(&set_ty, Value::Set(vec![Value::from(256), Value::from(0)]))
            .unwrap();
        assert_eq!(v, Value::Set(vec![Value::int(0.into(), IntType::U8)]));
    }
}
