use crate::decl::PrimitiveKind;
use crate::ir::{Format, Ty};

/// Schema type of a bare primitive, before any array/collection wrapping.
pub fn primitive_ty(kind: PrimitiveKind) -> Ty {
    match kind {
        PrimitiveKind::Boolean => Ty::Boolean,
        PrimitiveKind::Byte | PrimitiveKind::Short => Ty::whole(None),
        PrimitiveKind::Int => Ty::whole(Some(Format::Int32)),
        PrimitiveKind::Long => Ty::whole(Some(Format::Int64)),
        PrimitiveKind::Float => Ty::number(Some(Format::Float)),
        PrimitiveKind::Double => Ty::number(Some(Format::Double)),
        // serialized as a one-character string
        PrimitiveKind::Char => Ty::String,
    }
}
