//! Input model for shaderlift.
//!
//! A [`Unit`] is the fully resolved syntax tree handed over by the external
//! front-end: declarations, canonical types, statements, expressions, and
//! raw annotations. All cross references are dense ids into the unit, so a
//! unit can be serialized as JSON and loaded without pointer fix-ups.

mod attr;
mod builder;
mod decl;
mod error;
mod eval;
mod expr;
mod stmt;
mod types;
mod unit;

pub use attr::{Annotation, AnnotationArg, AttrSet, ShaderAttr};
pub use builder::UnitBuilder;
pub use decl::{
    Capture, Closure, CtorInit, Decl, DeclKind, EnumDecl, FieldDecl, FunctionDecl, MethodInfo,
    OverloadedOperator, ParamDecl, RecordDecl, SpecialMember, TemplateArg, TemplateKind, VarDecl,
};
pub use error::{AstError, AttrError};
pub use expr::{BinaryOperator, CallForm, CastKind, ConstValue, Expr, ExprKind, UnaryOperator};
pub use stmt::{LoopHint, Stmt};
pub use types::{BuiltinKind, QualType, RefKind, Type, TypeKind};
pub use unit::{DeclId, SourceLoc, TypeId, Unit};
