//! Shaderlift intermediate representation.
//!
//! A target-agnostic, arena-based tree IR for shader programs: types,
//! functions with structured bodies, namespace-scope storage, and
//! intrinsic templates that are specialized per call site. Downstream code
//! generators consume a [`Module`]; the translator builds one through the
//! builder methods on [`Module`].

pub mod arena;
mod attr;
mod display;
mod error;
mod expr;
mod func;
mod global;
mod intrinsic;
mod module;
mod namespace;
mod stmt;
mod types;

pub use arena::{Arena, Handle};
pub use attr::{Attribute, InterpolationMode, SemanticType, ShaderStage, has_attr};
pub use display::{dump_module, format_expr, format_type_inner};
pub use error::IrError;
pub use expr::{BinaryOp, CastKind, Expression, Literal, SwizzleComponent, UnaryOp};
pub use func::{Function, FunctionKind, Qualifier, Variable, VariableKind};
pub use global::{GlobalKind, GlobalVariable, StorageAccess};
pub use intrinsic::{Concept, IntrinsicTemplate, ReturnRule};
pub use module::{Builtins, Module, RESERVED_NAMES, check_name};
pub use namespace::Namespace;
pub use stmt::{Block, Statement, SwitchCase};
pub use types::{ArrayFlags, Field, ScalarKind, TypeDecl, TypeInner, VectorSize};
