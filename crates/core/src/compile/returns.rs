//! Response shape → return strategy.

use crate::ir::ReturnStrategy;
use crate::metadata::{GenericKind, TypeDescriptor, TypeKind};
use crate::resolve::{WellKnown, well_known};

/// Classify a declared response type. Total over every descriptor.
pub fn classify(response: Option<&TypeDescriptor>) -> ReturnStrategy {
    let Some(mut ty) = response else {
        return ReturnStrategy::NoContent;
    };
    loop {
        match (&ty.kind, well_known(ty)) {
            (
                TypeKind::Generic {
                    generic: GenericKind::Deferred,
                    args,
                },
                _,
            ) if args.is_empty() => return ReturnStrategy::NoContent,
            (
                TypeKind::Generic {
                    generic: GenericKind::Deferred | GenericKind::Nullable,
                    args,
                },
                _,
            )
            | (TypeKind::Generic { args, .. }, Some(WellKnown::Unwrap))
                if args.len() == 1 =>
            {
                ty = &args[0];
            }
            _ => break,
        }
    }

    match (well_known(ty), &ty.kind) {
        (Some(WellKnown::Void), _) => ReturnStrategy::NoContent,
        (Some(WellKnown::RawResponse), _) => ReturnStrategy::Stream,
        (Some(WellKnown::LooseObject), _) => ReturnStrategy::DynamicPassthrough,
        (_, TypeKind::String) => ReturnStrategy::StringPassthrough,
        (_, TypeKind::Primitive { .. } | TypeKind::Enum) => ReturnStrategy::PrimitiveParse,
        _ => ReturnStrategy::ComplexDeserialize,
    }
}
