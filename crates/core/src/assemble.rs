//! Pending types → namespace-grouped declarations.

use std::collections::{BTreeMap, HashSet};

use crate::config::MemberFilter;
use crate::docs::{self, DocProvider};
use crate::error::Diagnostic;
use crate::ir::{
    BaseRef, Declaration, DeclarationKind, EnumDecl, Field, NamespaceGroup, RecordDecl, TypeRef,
};
use crate::metadata::{GenericKind, TypeDescriptor, TypeKind};
use crate::naming::{short_name, strip_generic_arity};
use crate::resolve::{Resolver, well_known};

/// What a pending type becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declarable {
    Record,
    Enumeration,
}

/// Decide whether a type can be declared, and as what.
pub fn classify(ty: &TypeDescriptor) -> Result<Declarable, String> {
    if well_known(ty).is_some() {
        return Err("framework type with a fixed client mapping".to_string());
    }
    match &ty.kind {
        TypeKind::Custom => Ok(Declarable::Record),
        TypeKind::Enum => Ok(Declarable::Enumeration),
        TypeKind::Generic {
            generic: GenericKind::Custom,
            ..
        } if !ty.type_params.is_empty() => Ok(Declarable::Record),
        TypeKind::Generic { .. } => {
            Err("closed generic type; only generic definitions are declared".to_string())
        }
        TypeKind::Primitive { .. } | TypeKind::String => {
            Err("scalar types map to client primitives".to_string())
        }
        TypeKind::Array { .. } => Err("array types are referenced, not declared".to_string()),
        TypeKind::GenericParameter => {
            Err("open type parameters are not declarations".to_string())
        }
    }
}

/// Split input types into declarable ones and warnings for the rest.
/// A repeated qualified name keeps its first entry, as the registry does.
pub fn partition_declarable(types: &[TypeDescriptor]) -> (Vec<TypeDescriptor>, Vec<Diagnostic>) {
    let mut pending = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    for ty in types {
        if !seen.insert(ty.name.as_str()) {
            tracing::debug!(type_name = %ty.name, "skipping repeated type");
            continue;
        }
        match classify(ty) {
            Ok(_) => pending.push(ty.clone()),
            Err(reason) => {
                tracing::warn!(type_name = %ty.name, %reason, "skipping type");
                diagnostics.push(Diagnostic::UnsupportedTypeShape {
                    type_name: ty.name.clone(),
                    reason,
                });
            }
        }
    }
    (pending, diagnostics)
}

/// Builds declaration nodes for pending types.
pub struct Assembler<'a> {
    resolver: Resolver<'a>,
    filter: &'a dyn MemberFilter,
    docs: &'a dyn DocProvider,
}

impl std::fmt::Debug for Assembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<'a> Assembler<'a> {
    pub fn new(
        resolver: Resolver<'a>,
        filter: &'a dyn MemberFilter,
        docs: &'a dyn DocProvider,
    ) -> Self {
        Self {
            resolver,
            filter,
            docs,
        }
    }

    /// Group declarations by target namespace. Groups and the declarations
    /// inside them are ordered by name. Base references are left unlinked.
    pub fn assemble(&self, pending: &[TypeDescriptor]) -> Vec<NamespaceGroup> {
        let config = self.resolver.config();
        let mut groups: BTreeMap<String, NamespaceGroup> = BTreeMap::new();
        for ty in pending {
            let Ok(declarable) = classify(ty) else {
                continue;
            };
            let target = config.target_namespace(&ty.namespace);
            let declaration = match declarable {
                Declarable::Record => self.record(ty),
                Declarable::Enumeration => self.enumeration(ty),
            };
            groups
                .entry(target.clone())
                .or_insert_with(|| NamespaceGroup::new(target, ty.namespace.clone()))
                .declarations
                .push(declaration);
        }

        let mut groups: Vec<_> = groups.into_values().collect();
        for group in &mut groups {
            group.declarations.sort_by(|a, b| a.name.cmp(&b.name));
            tracing::debug!(
                namespace = %group.namespace,
                declarations = group.declarations.len(),
                "assembled namespace"
            );
        }
        groups
    }

    fn record(&self, ty: &TypeDescriptor) -> Declaration {
        let fields = ty
            .members
            .iter()
            .filter(|member| self.filter.include(ty, member))
            .map(|member| Field {
                name: member.name.clone(),
                ty: self.resolver.resolve(&member.ty),
                required: member.required,
                doc: self.lookup(
                    member.doc_key.as_deref(),
                    || docs::member_key(&ty.name, &member.name),
                ),
            })
            .collect();

        let base = ty.base.as_deref().map(|base| BaseRef {
            source_name: base.name.clone(),
            source_namespace: base.namespace.clone(),
            target: TypeRef::Named {
                namespace: None,
                name: strip_generic_arity(&base.name),
                args: base
                    .generic_args()
                    .iter()
                    .map(|arg| self.resolver.resolve(arg))
                    .collect(),
            },
        });

        Declaration {
            name: short_name(&ty.name, &ty.namespace),
            source_name: ty.name.clone(),
            doc: self.type_doc(ty),
            kind: DeclarationKind::Record(RecordDecl {
                type_params: ty.type_params.clone(),
                fields,
                base,
            }),
        }
    }

    fn enumeration(&self, ty: &TypeDescriptor) -> Declaration {
        let members = ty.enum_members.iter().map(|member| {
            let doc = self.lookup(member.doc_key.as_deref(), || {
                docs::constant_key(&ty.name, &member.name)
            });
            (member.name.clone(), member.value, doc)
        });
        Declaration {
            name: short_name(&ty.name, &ty.namespace),
            source_name: ty.name.clone(),
            doc: self.type_doc(ty),
            kind: DeclarationKind::Enumeration(EnumDecl::compact(members)),
        }
    }

    fn type_doc(&self, ty: &TypeDescriptor) -> Option<String> {
        self.lookup(ty.doc_key.as_deref(), || docs::type_key(&ty.name))
    }

    fn lookup(&self, explicit: Option<&str>, default_key: impl FnOnce() -> String) -> Option<String> {
        match explicit {
            Some(key) => self.docs.lookup(key),
            None => self.docs.lookup(&default_key()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{CherryPick, GeneratorConfig};
    use crate::docs::{DocMap, NoDocs};
    use crate::ir::ClientPrimitive;
    use crate::metadata::{EnumMember, MemberDescriptor, PrimitiveKind, Visibility};
    use crate::registry::TypeRegistry;

    fn member(name: &str, ty: TypeDescriptor, required: bool) -> MemberDescriptor {
        MemberDescriptor {
            name: name.into(),
            ty,
            required,
            visibility: Visibility::Public,
            ignored: false,
            doc_key: None,
        }
    }

    fn order() -> TypeDescriptor {
        let mut order = TypeDescriptor::new("Shop.Models.Order", "Shop.Models", TypeKind::Custom);
        order.members = vec![
            member("Id", TypeDescriptor::primitive(PrimitiveKind::Int32), true),
            member("Note", TypeDescriptor::string(), false),
            MemberDescriptor {
                ignored: true,
                ..member("Internal", TypeDescriptor::string(), false)
            },
        ];
        order.base = Some(Box::new(TypeDescriptor::new(
            "Shop.Common.Entity",
            "Shop.Common",
            TypeKind::Custom,
        )));
        order
    }

    fn weekday() -> TypeDescriptor {
        let mut day = TypeDescriptor::new("Shop.Models.Weekday", "Shop.Models", TypeKind::Enum);
        day.enum_members = [("Sat", 1), ("Sun", 5)]
            .into_iter()
            .map(|(name, value)| EnumMember {
                name: name.into(),
                value,
                doc_key: None,
            })
            .collect();
        day
    }

    fn assemble(types: &[TypeDescriptor], docs: &dyn DocProvider) -> Vec<NamespaceGroup> {
        let mut registry = TypeRegistry::new();
        registry.register(types.iter().cloned());
        let config = GeneratorConfig::default();
        let resolver = Resolver::new(&registry, &config);
        let filter = CherryPick::PublicNotIgnored;
        Assembler::new(resolver, &filter, docs).assemble(types)
    }

    #[test]
    fn test_record_fields_follow_cherry_pick() {
        let groups = assemble(&[order()], &NoDocs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].namespace, "Shop.Models.Client");
        let DeclarationKind::Record(record) = &groups[0].declarations[0].kind else {
            panic!("expected record");
        };
        let names: Vec<_> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Note"]);
        assert!(record.fields[0].required);
        assert!(!record.fields[1].required);
        assert_eq!(record.fields[0].ty, TypeRef::Primitive(ClientPrimitive::Integer));
    }

    #[test]
    fn test_base_is_left_unlinked() {
        let groups = assemble(&[order()], &NoDocs);
        let DeclarationKind::Record(record) = &groups[0].declarations[0].kind else {
            panic!("expected record");
        };
        let base = record.base.as_ref().unwrap();
        assert_eq!(base.source_namespace, "Shop.Common");
        assert_eq!(base.target, TypeRef::named(None, "Shop.Common.Entity"));
    }

    #[test]
    fn test_enum_compaction() {
        let groups = assemble(&[weekday()], &NoDocs);
        let DeclarationKind::Enumeration(decl) = &groups[0].declarations[0].kind else {
            panic!("expected enumeration");
        };
        assert_eq!(decl.index_base, 1);
        assert_eq!(decl.members[0].explicit, None);
        assert_eq!(decl.members[1].explicit, Some(5));
    }

    #[test]
    fn test_declarations_sorted_and_documented() {
        let docs = DocMap::new(HashMap::from([
            ("T:Shop.Models.Weekday".to_string(), "Day of week.".to_string()),
            ("P:Shop.Models.Order.Id".to_string(), "Identifier.".to_string()),
        ]));
        let groups = assemble(&[weekday(), order()], &docs);
        let names: Vec<_> = groups[0].declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Order", "Weekday"]);
        assert_eq!(groups[0].declarations[1].doc.as_deref(), Some("Day of week."));
        let DeclarationKind::Record(record) = &groups[0].declarations[0].kind else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].doc.as_deref(), Some("Identifier."));
    }

    #[test]
    fn test_partition_rejects_unsupported_shapes() {
        let list = TypeDescriptor::generic(
            "System.Collections.Generic.List`1",
            "System.Collections.Generic",
            GenericKind::Sequence,
            vec![TypeDescriptor::string()],
        );
        let action = TypeDescriptor::new(
            "Microsoft.AspNetCore.Mvc.IActionResult",
            "Microsoft.AspNetCore.Mvc",
            TypeKind::Custom,
        );
        let (pending, diagnostics) = partition_declarable(&[order(), list, action]);
        assert_eq!(pending.len(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::UnsupportedTypeShape { type_name, .. } if type_name == "System.Collections.Generic.List`1"
        ));
    }

    #[test]
    fn test_partition_keeps_first_of_repeated_name() {
        let mut second = weekday();
        second.enum_members.truncate(1);
        let (pending, diagnostics) = partition_declarable(&[weekday(), order(), second]);
        assert!(diagnostics.is_empty());
        let names: Vec<_> = pending.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Shop.Models.Weekday", "Shop.Models.Order"]);
        assert_eq!(pending[0].enum_members.len(), 2);

        let groups = assemble(&pending, &NoDocs);
        assert_eq!(groups[0].declarations.len(), 2);
    }

    #[test]
    fn test_generic_definition_is_record() {
        let mut page = TypeDescriptor::generic(
            "Shop.Models.Page`1",
            "Shop.Models",
            GenericKind::Custom,
            vec![],
        );
        page.type_params = vec!["T".into()];
        page.members = vec![member(
            "Items",
            TypeDescriptor::array(TypeDescriptor::new("T", "", TypeKind::GenericParameter), 1),
            true,
        )];
        assert_eq!(classify(&page), Ok(Declarable::Record));
        let groups = assemble(&[page], &NoDocs);
        let declaration = &groups[0].declarations[0];
        assert_eq!(declaration.name, "Page");
        let DeclarationKind::Record(record) = &declaration.kind else {
            panic!("expected record");
        };
        assert_eq!(record.type_params, vec!["T".to_string()]);
        assert_eq!(
            record.fields[0].ty,
            TypeRef::Array {
                element: Box::new(TypeRef::TypeParameter("T".into())),
                rank: 1,
            }
        );
    }
}
