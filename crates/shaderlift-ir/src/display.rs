//! Display implementations and text dump for debugging.

use std::fmt;

use crate::Module;
use crate::arena::Handle;
use crate::attr::{Attribute, InterpolationMode, ShaderStage};
use crate::expr::{BinaryOp, CastKind, Expression, Literal, SwizzleComponent, UnaryOp};
use crate::func::{Function, FunctionKind, Qualifier};
use crate::global::{GlobalKind, StorageAccess};
use crate::namespace::Namespace;
use crate::stmt::Statement;
use crate::types::TypeInner;

impl fmt::Display for StorageAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let read = self.contains(StorageAccess::READ);
        let write = self.contains(StorageAccess::WRITE);
        match (read, write) {
            (true, true) => write!(f, "read_write"),
            (true, false) => write!(f, "read"),
            (false, true) => write!(f, "write"),
            (false, false) => write!(f, "none"),
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "compute"),
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::NoInterpolation => "nointerpolation",
            Self::Centroid => "centroid",
            Self::Sample => "sample",
            Self::NoPerspective => "noperspective",
            Self::Invalid => "invalid",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "@stage({stage})"),
            Self::KernelSize([x, y, z]) => write!(f, "@kernel_size({x}, {y}, {z})"),
            Self::Semantic(s) => write!(f, "@semantic({})", s.name()),
            Self::Interpolation(mode) => write!(f, "@interpolation({mode})"),
            Self::ResourceBind { group, binding } => {
                write!(f, "@group({}) @binding({})", *group as i32, *binding as i32)
            }
            Self::PushConstant => write!(f, "@push_constant"),
            Self::StageInout => write!(f, "@stage_inout"),
            Self::Loop => write!(f, "@loop"),
            Self::Unroll(u32::MAX) => write!(f, "@unroll"),
            Self::Unroll(n) => write!(f, "@unroll({n})"),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Const => write!(f, "const "),
            Self::Inout => write!(f, "inout "),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}f"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::PreInc | Self::PostInc => "++",
            Self::PreDec | Self::PostDec => "--",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "&&",
            Self::Or => "||",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::BitAndAssign => "&=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for SwizzleComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
            Self::W => write!(f, "w"),
        }
    }
}

/// Formats the structural shape of a type, resolving inner handles by name.
pub fn format_type_inner(inner: &TypeInner, module: &Module) -> String {
    let name = |h| module.type_name(h).to_string();
    match *inner {
        TypeInner::Void => "void".into(),
        TypeInner::Scalar(kind) => format!("{kind:?}").to_lowercase(),
        TypeInner::Vector { scalar, size } => {
            format!("vec{}<{}>", size.count(), format!("{scalar:?}").to_lowercase())
        }
        TypeInner::Matrix { size } => format!("mat{0}x{0}<float>", size.count()),
        TypeInner::Array {
            element,
            count,
            flags,
        } => {
            let shared = if flags.contains(crate::ArrayFlags::SHARED) {
                " shared"
            } else {
                ""
            };
            format!("array<{}, {count}>{shared}", name(element))
        }
        TypeInner::Struct {
            ref fields,
            ref methods,
            ref constructors,
        } => format!(
            "struct({} fields, {} methods, {} constructors)",
            fields.len(),
            methods.len(),
            constructors.len()
        ),
        TypeInner::StructuredBuffer { element, access } => {
            format!("buffer<{}, {access}>", name(element))
        }
        TypeInner::ByteBuffer { access } => format!("byte_buffer<{access}>"),
        TypeInner::ConstantBuffer { element } => format!("constant_buffer<{}>", name(element)),
        TypeInner::Texture2D { element, access } => {
            format!("texture2d<{}, {access}>", name(element))
        }
        TypeInner::Texture3D { element, access } => {
            format!("texture3d<{}, {access}>", name(element))
        }
        TypeInner::Sampler => "sampler".into(),
        TypeInner::Accel => "accel".into(),
        TypeInner::RayQuery { flags } => format!("ray_query<{flags}>"),
        TypeInner::BindlessArray => "bindless_array".into(),
    }
}

fn join_attrs(attrs: &[Attribute]) -> String {
    attrs.iter().map(|a| format!("{a} ")).collect()
}

fn function_name(module: &Module, h: Handle<Function>) -> String {
    module
        .functions
        .try_get(h)
        .map_or_else(|| format!("{h:?}"), |f| f.name.clone())
}

/// Formats an expression, resolving locals against `func`.
pub fn format_expr(expr: &Expression, module: &Module, func: &Function) -> String {
    let fmt_args = |args: &[Expression]| -> String {
        args.iter()
            .map(|a| format_expr(a, module, func))
            .collect::<Vec<_>>()
            .join(", ")
    };
    match expr {
        Expression::Literal(lit) => format!("{lit}"),
        Expression::Local(h) => func
            .variables
            .try_get(*h)
            .map_or_else(|| format!("local{h:?}"), |v| v.name.clone()),
        Expression::Global(h) => module
            .globals
            .try_get(*h)
            .map_or_else(|| format!("global{h:?}"), |g| g.name.clone()),
        Expression::Function(h) => format!("&{}", function_name(module, *h)),
        Expression::This(_) => "this".into(),
        Expression::Field { base, owner, index } => {
            let base = format_expr(base, module, func);
            let field = module
                .types
                .try_get(*owner)
                .and_then(|t| t.fields().get(*index as usize))
                .map_or_else(|| format!("{index}"), |f| f.name.clone());
            format!("{base}.{field}")
        }
        Expression::Swizzle {
            vector, pattern, ..
        } => {
            let comps: String = pattern.iter().map(|c| format!("{c}")).collect();
            format!("{}.{comps}", format_expr(vector, module, func))
        }
        Expression::Access { base, index } => format!(
            "{}[{}]",
            format_expr(base, module, func),
            format_expr(index, module, func)
        ),
        Expression::Method { base, method } => format!(
            "{}.{}",
            format_expr(base, module, func),
            function_name(module, *method)
        ),
        Expression::Unary { op, expr } => {
            let inner = format_expr(expr, module, func);
            match op {
                UnaryOp::PostInc | UnaryOp::PostDec => format!("({inner}{op})"),
                _ => format!("({op}{inner})"),
            }
        }
        Expression::Binary { op, left, right } => format!(
            "({} {op} {})",
            format_expr(left, module, func),
            format_expr(right, module, func)
        ),
        Expression::Call {
            function,
            arguments,
        } => format!("{}({})", function_name(module, *function), fmt_args(arguments)),
        Expression::MethodCall {
            receiver,
            method,
            arguments,
        } => format!(
            "{}.{}({})",
            format_expr(receiver, module, func),
            function_name(module, *method),
            fmt_args(arguments)
        ),
        Expression::Construct { ty, arguments } => {
            format!("{}({})", module.type_name(*ty), fmt_args(arguments))
        }
        Expression::InitList(items) => format!("{{{}}}", fmt_args(items)),
        Expression::Conditional {
            condition,
            accept,
            reject,
        } => format!(
            "({} ? {} : {})",
            format_expr(condition, module, func),
            format_expr(accept, module, func),
            format_expr(reject, module, func)
        ),
        Expression::Cast { kind, ty, expr } => {
            let k = match kind {
                CastKind::Static => "static_cast",
                CastKind::Implicit => "implicit_cast",
            };
            format!(
                "{k}<{}>({})",
                module.type_name(*ty),
                format_expr(expr, module, func)
            )
        }
    }
}

fn write_block(out: &mut String, block: &[Statement], module: &Module, func: &Function, indent: usize) {
    for s in block {
        write_stmt(out, s, module, func, indent);
    }
}

fn write_var(out: &mut String, h: Handle<crate::Variable>, module: &Module, func: &Function, pad: &str) {
    let Some(var) = func.variables.try_get(h) else {
        out.push_str(&format!("{pad}var {h:?}\n"));
        return;
    };
    let init = match &var.init {
        Some(e) => format!(" = {}", format_expr(e, module, func)),
        None => String::new(),
    };
    out.push_str(&format!(
        "{pad}{}var {}: {}{init}\n",
        var.qualifier,
        var.name,
        module.type_name(var.ty)
    ));
}

fn write_stmt(out: &mut String, stmt: &Statement, module: &Module, func: &Function, indent: usize) {
    let pad = " ".repeat(indent);
    match stmt {
        Statement::Block(block) => {
            out.push_str(&format!("{pad}{{\n"));
            write_block(out, block, module, func, indent + 4);
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::Expr(e) => {
            out.push_str(&format!("{pad}{}\n", format_expr(e, module, func)));
        }
        Statement::Declare(h) => write_var(out, *h, module, func, &pad),
        Statement::DeclGroup(vars) => {
            for h in vars {
                write_var(out, *h, module, func, &pad);
            }
        }
        Statement::If {
            condition,
            accept,
            reject,
        } => {
            out.push_str(&format!(
                "{pad}If ({}) {{\n",
                format_expr(condition, module, func)
            ));
            write_block(out, accept, module, func, indent + 4);
            if let Some(reject) = reject {
                out.push_str(&format!("{pad}}} else {{\n"));
                write_block(out, reject, module, func, indent + 4);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::Switch { selector, cases } => {
            out.push_str(&format!(
                "{pad}Switch ({}) {{\n",
                format_expr(selector, module, func)
            ));
            for case in cases {
                match &case.value {
                    Some(v) => out.push_str(&format!(
                        "{pad}  Case {}:\n",
                        format_expr(v, module, func)
                    )),
                    None => out.push_str(&format!("{pad}  Default:\n")),
                }
                write_block(out, &case.body, module, func, indent + 4);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::While {
            condition,
            body,
            attrs,
        } => {
            out.push_str(&format!(
                "{pad}{}While ({}) {{\n",
                join_attrs(attrs),
                format_expr(condition, module, func)
            ));
            write_block(out, body, module, func, indent + 4);
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::For {
            init,
            condition,
            step,
            body,
            attrs,
        } => {
            let opt = |e: &Option<Expression>| {
                e.as_ref()
                    .map(|e| format_expr(e, module, func))
                    .unwrap_or_default()
            };
            out.push_str(&format!(
                "{pad}{}For (; {}; {}) {{\n",
                join_attrs(attrs),
                opt(condition),
                opt(step)
            ));
            if let Some(init) = init {
                out.push_str(&format!("{pad}  Init:\n"));
                write_stmt(out, init, module, func, indent + 4);
            }
            write_block(out, body, module, func, indent + 4);
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::Break => out.push_str(&format!("{pad}Break\n")),
        Statement::Continue => out.push_str(&format!("{pad}Continue\n")),
        Statement::Return(value) => match value {
            Some(v) => out.push_str(&format!("{pad}Return {}\n", format_expr(v, module, func))),
            None => out.push_str(&format!("{pad}Return\n")),
        },
        Statement::Comment(text) => out.push_str(&format!("{pad}// {text}\n")),
    }
}

fn dump_function(out: &mut String, module: &Module, handle: Handle<Function>, func: &Function) {
    let label = match &func.kind {
        FunctionKind::Free => "fn".to_string(),
        FunctionKind::Method { owner } => format!("method {}::", module.type_name(*owner)),
        FunctionKind::Constructor { owner, .. } => format!("ctor {}::", module.type_name(*owner)),
        FunctionKind::Intrinsic { .. } => "intrinsic".to_string(),
    };
    let sep = if label.ends_with("::") { "" } else { " " };
    let args: Vec<_> = func
        .params
        .iter()
        .filter_map(|&p| func.variables.try_get(p))
        .map(|p| {
            format!(
                "{}{}{}: {}",
                join_attrs(&p.attrs),
                p.qualifier,
                p.name,
                module.type_name(p.ty)
            )
        })
        .collect();
    let ret = match func.result {
        Some(r) => format!(" -> {}", module.type_name(r)),
        None => String::new(),
    };
    out.push_str(&format!(
        "  {}{label}{sep}{}({})  [{handle:?}]{ret}",
        join_attrs(&func.attrs),
        func.name,
        args.join(", ")
    ));

    if let FunctionKind::Constructor { owner, member_inits } = &func.kind {
        if func.body.is_none() && member_inits.is_empty() {
            out.push_str(" {}\n");
            return;
        }
        out.push_str(" {\n");
        for (index, init) in member_inits {
            let field = module
                .types
                .try_get(*owner)
                .and_then(|t| t.fields().get(*index as usize))
                .map_or_else(|| index.to_string(), |f| f.name.clone());
            out.push_str(&format!(
                "    init {field} = {}\n",
                format_expr(init, module, func)
            ));
        }
    } else if func.body.is_none() {
        out.push('\n');
        return;
    } else {
        out.push_str(" {\n");
    }

    if let Some(body) = &func.body {
        write_block(out, body, module, func, 4);
    }
    out.push_str("  }\n");
}

fn dump_namespace(out: &mut String, module: &Module, ns: &Namespace, indent: usize) {
    let pad = " ".repeat(indent);
    out.push_str(&format!("{pad}namespace {} {{\n", ns.name));
    for &ty in &ns.types {
        out.push_str(&format!("{pad}  type {}\n", module.type_name(ty)));
    }
    for &f in &ns.functions {
        out.push_str(&format!("{pad}  fn {}\n", function_name(module, f)));
    }
    for &g in &ns.globals {
        if let Some(g) = module.globals.try_get(g) {
            out.push_str(&format!("{pad}  global {}\n", g.name));
        }
    }
    for &nested in &ns.nested {
        if let Some(nested) = module.namespaces.try_get(nested) {
            dump_namespace(out, module, nested, indent + 2);
        }
    }
    out.push_str(&format!("{pad}}}\n"));
}

/// Produces a human-readable text dump of a [`Module`] for debugging.
///
/// Builtin types are omitted unless they were created by the translation
/// (arrays, buffers, and other interned composites).
pub fn dump_module(module: &Module) -> String {
    let mut out = String::new();
    let seeded = module.builtins.float4x4.index();

    // Types
    out.push_str("Types:\n");
    for (handle, ty) in module.types.iter() {
        if handle.index() <= seeded {
            continue;
        }
        match &ty.inner {
            TypeInner::Struct { fields, .. } => {
                out.push_str(&format!(
                    "  {}struct {} {{  [{handle:?}] size {} align {}\n",
                    join_attrs(&ty.attrs),
                    ty.name,
                    ty.size,
                    ty.alignment
                ));
                for field in fields {
                    out.push_str(&format!(
                        "    {}{}: {}\n",
                        join_attrs(&field.attrs),
                        field.name,
                        module.type_name(field.ty)
                    ));
                }
                out.push_str("  }\n");
            }
            inner => {
                out.push_str(&format!(
                    "  {handle:?} {} = {}\n",
                    ty.name,
                    format_type_inner(inner, module)
                ));
            }
        }
    }

    // Global variables
    if !module.globals.is_empty() {
        out.push_str("\nGlobals:\n");
        let empty = Function::new("", FunctionKind::Free);
        for (handle, var) in module.globals.iter() {
            let kind = match var.kind {
                GlobalKind::Constant => "const",
                GlobalKind::Resource => "resource",
                GlobalKind::GroupShared => "groupshared",
            };
            let init = match &var.init {
                Some(e) => format!(" = {}", format_expr(e, module, &empty)),
                None => String::new(),
            };
            out.push_str(&format!(
                "  {handle:?} {}{kind} {}: {}{init}\n",
                join_attrs(&var.attrs),
                var.name,
                module.type_name(var.ty)
            ));
        }
    }

    // Functions
    if !module.functions.is_empty() {
        out.push_str("\nFunctions:\n");
        for (handle, func) in module.functions.iter() {
            dump_function(&mut out, module, handle, func);
        }
    }

    // Namespaces
    let roots: Vec<_> = module
        .namespaces
        .iter()
        .filter(|(_, ns)| ns.parent.is_none())
        .collect();
    if !roots.is_empty() {
        out.push_str("\nNamespaces:\n");
        for (_, ns) in roots {
            dump_namespace(&mut out, module, ns, 2);
        }
    }

    out
}
