//! End-to-end translation of small units through the public entry point.

use shaderlift_ast::*;
use shaderlift_ir::{
    ArrayFlags, Attribute, BinaryOp, Expression, Function, FunctionKind, GlobalKind, Handle,
    Literal, Module, Qualifier, SemanticType, ShaderStage, Statement, SwizzleComponent, TypeInner,
    UnaryOp, dump_module,
};
use shaderlift_translate::{TranslateError, TranslateOptions, translate};

fn run(unit: &Unit) -> Result<Module, TranslateError> {
    translate(unit, &TranslateOptions::default())
}

fn function<'a>(module: &'a Module, name: &str) -> (Handle<Function>, &'a Function) {
    module
        .functions
        .iter()
        .find(|(_, f)| f.name == name)
        .unwrap_or_else(|| panic!("no function `{name}`"))
}

fn param_names(f: &Function) -> Vec<&str> {
    f.params.iter().map(|&p| f.variables[p].name.as_str()).collect()
}

fn compute_entry(b: &mut UnitBuilder, name: &str, stage: Vec<AnnotationArg>) -> DeclId {
    let void = b.builtin(BuiltinKind::Void);
    let main = b.function(None, name, void);
    b.set_body(main, Stmt::Compound(Vec::new()));
    b.annotate_with(main, "stage", stage);
    b.annotate_with(main, "kernel", vec![AnnotationArg::Int(8), AnnotationArg::Int(8)]);
    main
}

fn compute() -> Vec<AnnotationArg> {
    vec![AnnotationArg::Str("compute".into())]
}

/// A body-less function whose calls lower to the primitive named by `ann`.
fn primitive(
    b: &mut UnitBuilder,
    name: &str,
    result: TypeId,
    ann: Annotation,
    params: &[TypeId],
) -> DeclId {
    let f = b.function(None, name, result);
    for (i, &ty) in params.iter().enumerate() {
        b.param(f, &format!("p{i}"), ty);
    }
    b.annotate(f, ann);
    f
}

#[test]
fn entries_translate_their_callees_once() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let uint = b.builtin(BuiltinKind::UInt);

    let twice = b.function(None, "twice", float);
    let x = b.param(twice, "x", float);
    b.set_body(
        twice,
        Stmt::compound([Stmt::Return(Some(Expr::binary(
            BinaryOperator::Mul,
            Expr::decl_ref(x, float),
            Expr::float(2.0, float),
            float,
        )))]),
    );

    let main = compute_entry(&mut b, "main", compute());
    let tid = b.param(main, "tid", uint);
    b.annotate(tid, Annotation::with_str("builtin", "ThreadID"));
    let first = b.local(main, "a", float, Some(Expr::call(twice, vec![Expr::float(1.0, float)], float)));
    let second = b.local(
        main,
        "b",
        float,
        Some(Expr::call(twice, vec![Expr::decl_ref(first, float)], float)),
    );
    b.set_body(main, Stmt::compound([Stmt::Decl(vec![first]), Stmt::Decl(vec![second])]));
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let names: Vec<_> = module.functions.iter().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, ["twice", "main"]);

    let (twice_ir, helper) = function(&module, "twice");
    assert_eq!(param_names(helper), ["x_0"]);
    assert_eq!(
        helper.body,
        Some(vec![Statement::Return(Some(Expression::binary(
            BinaryOp::Mul,
            Expression::Local(helper.params[0]),
            Expression::Literal(Literal::Float(2.0)),
        )))])
    );

    let (_, entry) = function(&module, "main");
    assert_eq!(
        entry.attrs,
        [Attribute::Stage(ShaderStage::Compute), Attribute::KernelSize([8, 8, 1])]
    );
    let tid = &entry.variables[entry.params[0]];
    assert_eq!(tid.name, "tid_0");
    assert_eq!(tid.attrs, [Attribute::Semantic(SemanticType::ThreadID)]);

    let body = entry.body.as_ref().expect("entry has a body");
    let [Statement::Declare(a), Statement::Declare(b)] = body[..] else {
        panic!("expected two declarations, got {body:?}");
    };
    assert_eq!(
        entry.variables[a].init,
        Some(Expression::Call {
            function: twice_ir,
            arguments: vec![Expression::Literal(Literal::Float(1.0))],
        })
    );
    assert_eq!(
        entry.variables[b].init,
        Some(Expression::Call {
            function: twice_ir,
            arguments: vec![Expression::Local(a)],
        })
    );
}

#[test]
fn entry_filter_keeps_named_entries() {
    let mut b = UnitBuilder::new();
    compute_entry(&mut b, "clear", compute());
    let mut renamed = compute();
    renamed.push(AnnotationArg::Str("blur_cs".into()));
    compute_entry(&mut b, "blur", renamed);
    let unit = b.finish();

    let all = run(&unit).expect("translates");
    assert_eq!(all.functions.len(), 2);

    let options = TranslateOptions {
        entries: vec!["blur_cs".into()],
    };
    let filtered = translate(&unit, &options).expect("translates");
    let names: Vec<_> = filtered.functions.iter().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, ["blur_cs"]);
}

#[test]
fn records_enums_and_namespaces() {
    let mut b = UnitBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let float3 = b.vector(BuiltinKind::Float, 3);
    let gfx = b.namespace(None, "gfx");
    let (_, mode_ty) = b.enumeration(Some(gfx), "Mode", int, &[("Off", 0), ("On", 1)]);
    let (light, _) = b.record(Some(gfx), "Light");
    b.field(light, "color", float3);
    b.field(light, "mode", mode_ty);
    let reopened = b.reopen_namespace(gfx);
    b.record(Some(reopened), "Camera");
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let light = module.find_type("Light").expect("Light is emitted");
    let fields = module.types[light].fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].ty, module.builtins.float3);
    assert_eq!(fields[1].ty, module.builtins.int);

    let globals: Vec<_> = module.globals.iter().map(|(_, g)| g.name.as_str()).collect();
    assert_eq!(globals, ["Mode__Off", "Mode__On"]);
    let (_, on) = module.globals.iter().nth(1).expect("two constants");
    assert_eq!(on.init, Some(Expression::int(1)));

    assert_eq!(module.namespaces.len(), 1);
    let (_, ns) = module.namespaces.iter().next().expect("one namespace");
    assert_eq!(ns.name, "gfx");
    assert_eq!(ns.types.len(), 2);
    assert_eq!(ns.globals.len(), 2);
}

#[test]
fn same_named_namespaces_under_different_parents_stay_apart() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let mut details = Vec::new();
    for (parent, record) in [("sky", "Sun"), ("sea", "Wave")] {
        let outer = b.namespace(None, parent);
        let detail = b.namespace(Some(outer), "detail");
        let (r, _) = b.record(Some(detail), record);
        b.field(r, "height", float);
        details.push(record);
    }
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let detail: Vec<_> = module
        .namespaces
        .iter()
        .filter(|(_, ns)| ns.name == "detail")
        .map(|(_, ns)| ns)
        .collect();
    assert_eq!(detail.len(), 2);
    for (ns, record) in detail.iter().zip(&details) {
        let parent = ns.parent.expect("nested");
        assert_ne!(module.namespaces[parent].name, "detail");
        let names: Vec<_> = ns.types.iter().map(|&t| module.type_name(t)).collect();
        assert_eq!(names, [*record]);
    }
}

#[test]
fn closures_receive_their_captures() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let apply = b.function(None, "apply", float);
    b.annotate(apply, Annotation::flag("noignore"));
    let x = b.local(apply, "x", float, Some(Expr::float(1.0, float)));
    let (class, call, closure_ty) =
        b.closure(apply, vec![Capture::Var { var: x, by_ref: true }], float);
    b.set_body(
        call,
        Stmt::compound([
            Stmt::Expr(Expr::binary(
                BinaryOperator::AddAssign,
                Expr::decl_ref(x, float),
                Expr::float(1.0, float),
                float,
            )),
            Stmt::Return(Some(Expr::decl_ref(x, float))),
        ]),
    );
    let f = b.local(
        apply,
        "f",
        closure_ty,
        Some(Expr::new(ExprKind::Lambda { class }, closure_ty)),
    );
    b.set_body(
        apply,
        Stmt::compound([
            Stmt::Decl(vec![x]),
            Stmt::Decl(vec![f]),
            Stmt::Return(Some(Expr::operator_call(call, vec![Expr::decl_ref(f, closure_ty)], float))),
        ]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let proxy = module.find_type("lambda_proxy").expect("closure proxy");

    let (op_ir, op) = function(&module, "operator_call");
    assert_eq!(param_names(op), ["_this", "cap_x"]);
    assert_eq!(op.variables[op.params[0]].qualifier, Qualifier::Const);
    assert_eq!(op.variables[op.params[1]].qualifier, Qualifier::Inout);
    assert_eq!(
        op.body.as_ref().and_then(|b| b.last()),
        Some(&Statement::Return(Some(Expression::Local(op.params[1]))))
    );

    let (_, outer) = function(&module, "apply");
    let body = outer.body.as_ref().expect("apply has a body");
    let [Statement::Declare(x_ir), Statement::Comment(ref note), Statement::Return(Some(ref ret))] =
        body[..]
    else {
        panic!("unexpected body {body:?}");
    };
    assert_eq!(note, "this line is a lambda decl");
    assert_eq!(
        *ret,
        Expression::Call {
            function: op_ir,
            arguments: vec![
                Expression::Construct {
                    ty: proxy,
                    arguments: Vec::new(),
                },
                Expression::Local(x_ir),
            ],
        }
    );
}

#[test]
fn constructors_taking_closures_receive_their_captures() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let apply = b.function(None, "apply", float);
    b.annotate(apply, Annotation::flag("noignore"));
    let x = b.local(apply, "x", float, Some(Expr::float(1.0, float)));
    let (class, call, closure_ty) =
        b.closure(apply, vec![Capture::Var { var: x, by_ref: true }], float);
    b.set_body(call, Stmt::compound([Stmt::Return(Some(Expr::decl_ref(x, float)))]));

    let (holder, holder_ty) = b.record(None, "Holder");
    b.field(holder, "weight", float);
    let ctor = b.constructor(holder, Vec::new());
    b.param(ctor, "f", closure_ty);

    let f = b.local(
        apply,
        "f",
        closure_ty,
        Some(Expr::new(ExprKind::Lambda { class }, closure_ty)),
    );
    let built = Expr::new(
        ExprKind::Construct {
            ctor,
            args: vec![Expr::decl_ref(f, closure_ty)],
        },
        holder_ty,
    );
    let h = b.local(apply, "h", holder_ty, Some(built));
    b.set_body(
        apply,
        Stmt::compound([
            Stmt::Decl(vec![x]),
            Stmt::Decl(vec![f]),
            Stmt::Decl(vec![h]),
            Stmt::Return(Some(Expr::decl_ref(x, float))),
        ]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let proxy = module.find_type("lambda_proxy").expect("closure proxy");
    let holder_ir = module.find_type("Holder").expect("Holder is emitted");

    let (_, ctor_ir) = function(&module, "ctor");
    assert!(matches!(ctor_ir.kind, FunctionKind::Constructor { owner, .. } if owner == holder_ir));
    assert_eq!(param_names(ctor_ir), ["f_0", "cap_x"]);
    assert_eq!(ctor_ir.variables[ctor_ir.params[1]].qualifier, Qualifier::Inout);

    let (_, outer) = function(&module, "apply");
    let body = outer.body.as_ref().expect("apply has a body");
    let [Statement::Declare(x_ir), Statement::Comment(_), Statement::Declare(h_ir), _] = body[..]
    else {
        panic!("unexpected body {body:?}");
    };
    let Some(Expression::Construct { ty, ref arguments }) = outer.variables[h_ir].init else {
        panic!("expected a construction");
    };
    assert_eq!(ty, holder_ir);
    assert_eq!(arguments.len(), ctor_ir.params.len());
    assert_eq!(
        *arguments,
        [
            Expression::Construct {
                ty: proxy,
                arguments: Vec::new(),
            },
            Expression::Local(x_ir),
        ]
    );
}

#[test]
fn closures_capture_fields_read_through_this() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let (light, light_ty) = b.record(None, "Light");
    let intensity = b.field(light, "intensity", float);
    b.field(light, "radius", float);
    let float3 = b.vector(BuiltinKind::Float, 3);
    b.field(light, "color", float3);
    let scaled = b.method(light, "scaled", float);
    b.annotate(scaled, Annotation::flag("noignore"));
    let (class, call, closure_ty) = b.closure(scaled, vec![Capture::This], float);
    b.set_body(
        call,
        Stmt::compound([Stmt::Return(Some(Expr::member(
            Expr::this(light_ty),
            intensity,
            float,
        )))]),
    );
    let f = b.local(
        scaled,
        "f",
        closure_ty,
        Some(Expr::new(ExprKind::Lambda { class }, closure_ty)),
    );
    b.set_body(
        scaled,
        Stmt::compound([
            Stmt::Decl(vec![f]),
            Stmt::Return(Some(Expr::operator_call(call, vec![Expr::decl_ref(f, closure_ty)], float))),
        ]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let light_ir = module.find_type("Light").expect("Light is emitted");

    assert_eq!(module.types[light_ir].fields().len(), 3);

    // Only the field the closure reads becomes a capture.
    let (op_ir, op) = function(&module, "operator_call");
    assert_eq!(param_names(op), ["_this", "cap_intensity"]);
    assert_eq!(
        op.body,
        Some(vec![Statement::Return(Some(Expression::Local(op.params[1])))])
    );

    let (_, method) = function(&module, "scaled");
    assert!(matches!(method.kind, FunctionKind::Method { owner } if owner == light_ir));
    let Some(Statement::Return(Some(Expression::Call { function, arguments }))) =
        method.body.as_ref().and_then(|b| b.last())
    else {
        panic!("expected a returned call");
    };
    assert_eq!(*function, op_ir);
    assert_eq!(arguments.len(), op.params.len());
    assert_eq!(
        arguments[1],
        Expression::Field {
            base: Box::new(Expression::This(light_ir)),
            owner: light_ir,
            index: 0,
        }
    );
}

#[test]
fn primitive_call_forms_lower_to_operators() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let int = b.builtin(BuiltinKind::Int);
    let quad = b.constant_array(float, 4);
    let neg = primitive(&mut b, "neg", float, Annotation::with_str("unaop", "MINUS"), &[float]);
    let add = primitive(&mut b, "add", float, Annotation::with_str("binop", "ADD"), &[float, float]);
    let root = primitive(&mut b, "root", float, Annotation::with_str("callop", "SQRT"), &[float]);
    let at = primitive(&mut b, "at", float, Annotation::flag("access"), &[quad, int]);

    let shade = b.function(None, "shade", float);
    b.annotate(shade, Annotation::flag("noignore"));
    let weights = b.param(shade, "weights", quad);
    let picked = Expr::call(at, vec![Expr::decl_ref(weights, quad), Expr::int(1, int)], float);
    let sum = Expr::call(
        add,
        vec![
            Expr::call(root, vec![Expr::float(4.0, float)], float),
            Expr::call(neg, vec![picked], float),
        ],
        float,
    );
    b.set_body(shade, Stmt::compound([Stmt::Return(Some(sum))]));
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let names: Vec<_> = module.functions.iter().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, ["sqrt", "shade"]);

    let (sqrt_ir, sqrt) = function(&module, "sqrt");
    assert!(matches!(sqrt.kind, FunctionKind::Intrinsic { .. }));
    assert_eq!(sqrt.result, Some(module.builtins.float));
    assert_eq!(sqrt.variables[sqrt.params[0]].qualifier, Qualifier::None);

    let (_, shade) = function(&module, "shade");
    assert_eq!(
        shade.body,
        Some(vec![Statement::Return(Some(Expression::binary(
            BinaryOp::Add,
            Expression::Call {
                function: sqrt_ir,
                arguments: vec![Expression::Literal(Literal::Float(4.0))],
            },
            Expression::unary(
                UnaryOp::Minus,
                Expression::access(Expression::Local(shade.params[0]), Expression::int(1)),
            ),
        )))])
    );
}

#[test]
fn member_intrinsics_take_their_receiver_inout() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let uint = b.builtin(BuiltinKind::UInt);
    let buffer = b.buffer(float, 1);
    let buffer_record = b
        .unit()
        .record_of(buffer)
        .expect("valid type")
        .expect("buffers are records");
    let load = b.method(buffer_record, "load", float);
    b.param(load, "index", uint);
    b.annotate(load, Annotation::with_str("callop", "BUFFER_READ"));

    let particles = b.global(None, "particles", buffer, None);
    b.annotate_with(particles, "binding", vec![AnnotationArg::Int(3), AnnotationArg::Int(1)]);
    let settings = b.global(None, "settings", buffer, None);
    b.annotate(settings, Annotation::flag("push_constant"));

    let shade = b.function(None, "shade", float);
    b.annotate(shade, Annotation::flag("noignore"));
    let read = |from: DeclId, index: i64| {
        Expr::member_call(Expr::decl_ref(from, buffer), load, vec![Expr::int(index, uint)], float)
    };
    b.set_body(
        shade,
        Stmt::compound([
            Stmt::Expr(read(settings, 0)),
            Stmt::Return(Some(read(particles, 2))),
        ]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let (read_ir, read) = function(&module, "buffer_read");
    let qualifiers: Vec<_> = read.params.iter().map(|&p| read.variables[p].qualifier).collect();
    assert_eq!(qualifiers, [Qualifier::Inout, Qualifier::None]);
    assert_eq!(read.result, Some(module.builtins.float));

    let globals: Vec<_> = module.globals.iter().map(|(h, g)| (h, g)).collect();
    let [(settings_ir, settings), (particles_ir, particles)] = globals[..] else {
        panic!("expected two resources, got {globals:?}");
    };
    assert_eq!(settings.name, "settings");
    assert_eq!(settings.kind, GlobalKind::Resource);
    assert_eq!(
        settings.attrs,
        [Attribute::ResourceBind { group: !0, binding: !0 }, Attribute::PushConstant]
    );
    assert_eq!(particles.attrs, [Attribute::ResourceBind { group: 1, binding: 3 }]);

    let (_, shade) = function(&module, "shade");
    assert_eq!(
        shade.body,
        Some(vec![
            Statement::Expr(Expression::Call {
                function: read_ir,
                arguments: vec![Expression::Global(settings_ir), Expression::int(0)],
            }),
            Statement::Return(Some(Expression::Call {
                function: read_ir,
                arguments: vec![Expression::Global(particles_ir), Expression::int(2)],
            })),
        ])
    );
}

#[test]
fn unknown_intrinsics_fail_to_resolve() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let bogus =
        primitive(&mut b, "bogus", float, Annotation::with_str("callop", "NOT_AN_INTRINSIC"), &[float]);
    let shade = b.function(None, "shade", float);
    b.annotate(shade, Annotation::flag("noignore"));
    b.set_body(
        shade,
        Stmt::compound([Stmt::Return(Some(Expr::call(bogus, vec![Expr::float(1.0, float)], float)))]),
    );
    let unit = b.finish();

    let err = run(&unit).expect_err("no such intrinsic");
    assert!(matches!(err, TranslateError::Resolution { .. }), "{err}");
    assert!(err.to_string().contains("NOT_AN_INTRINSIC"), "{err}");
}

#[test]
fn groupshared_arrays_are_shared() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let int = b.builtin(BuiltinKind::Int);
    let void = b.builtin(BuiltinKind::Void);
    let row = b.constant_array(float, 64);
    let tile = b.global(None, "tile", row, None);
    b.annotate(tile, Annotation::flag("groupshared"));

    let clear = b.function(None, "clear", void);
    b.annotate(clear, Annotation::flag("noignore"));
    let slot = Expr::new(
        ExprKind::ArraySubscript {
            base: Box::new(Expr::decl_ref(tile, row)),
            index: Box::new(Expr::int(0, int)),
        },
        float,
    );
    b.set_body(
        clear,
        Stmt::compound([Stmt::Expr(Expr::binary(
            BinaryOperator::Assign,
            slot,
            Expr::float(0.0, float),
            float,
        ))]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let (tile_ir, tile) = module.globals.iter().next().expect("tile is emitted");
    assert_eq!(tile.name, "tile");
    assert_eq!(tile.kind, GlobalKind::GroupShared);
    assert!(matches!(
        module.types[tile.ty].inner,
        TypeInner::Array { count: 64, flags, .. } if flags.contains(ArrayFlags::SHARED)
    ));

    let (_, clear) = function(&module, "clear");
    assert_eq!(
        clear.body,
        Some(vec![Statement::Expr(Expression::binary(
            BinaryOp::Assign,
            Expression::access(Expression::Global(tile_ir), Expression::int(0)),
            Expression::Literal(Literal::Float(0.0)),
        ))])
    );
}

#[test]
fn swizzle_fields_lower_to_swizzles() {
    let mut b = UnitBuilder::new();
    let float2 = b.vector(BuiltinKind::Float, 2);
    let float3 = b.vector(BuiltinKind::Float, 3);
    let vec3 = b.unit().record_of(float3).expect("valid type").expect("vectors are records");
    let xy = b.field(vec3, "xy", float2);
    b.annotate(xy, Annotation::flag("swizzle"));

    let flatten = b.function(None, "flatten", float2);
    b.annotate(flatten, Annotation::flag("noignore"));
    let p = b.param(flatten, "p", float3);
    b.set_body(
        flatten,
        Stmt::compound([Stmt::Return(Some(Expr::member(Expr::decl_ref(p, float3), xy, float2)))]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let (_, flatten) = function(&module, "flatten");
    assert_eq!(flatten.result, Some(module.builtins.float2));
    assert_eq!(
        flatten.body,
        Some(vec![Statement::Return(Some(Expression::Swizzle {
            vector: Box::new(Expression::Local(flatten.params[0])),
            ty: module.builtins.float2,
            pattern: vec![SwizzleComponent::X, SwizzleComponent::Y],
        }))])
    );
}

#[test]
fn implicit_special_members_lower_to_plain_values() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let (light, light_ty) = b.record(None, "Light");
    let intensity = b.field(light, "intensity", float);

    let copy = b.constructor(light, Vec::new());
    b.param(copy, "other", QualType::new(light_ty).lvalue_ref());
    b.decl_mut(copy).implicit = true;
    b.function_mut(copy).special_member = Some(SpecialMember::CopyConstructor);

    let assign = b.method(light, "operator=", QualType::new(light_ty).lvalue_ref());
    b.param(assign, "other", QualType::new(light_ty).lvalue_ref());
    b.decl_mut(assign).implicit = true;
    b.function_mut(assign).operator = Some(OverloadedOperator::Equal);
    b.function_mut(assign).special_member = Some(SpecialMember::CopyAssign);

    let dim = b.function(None, "dim", float);
    b.annotate(dim, Annotation::flag("noignore"));
    let source = b.param(dim, "source", light_ty);
    let copied = Expr::new(
        ExprKind::Construct {
            ctor: copy,
            args: vec![Expr::decl_ref(source, light_ty)],
        },
        light_ty,
    );
    let local = b.local(dim, "local", light_ty, Some(copied));
    b.set_body(
        dim,
        Stmt::compound([
            Stmt::Decl(vec![local]),
            Stmt::Expr(Expr::operator_call(
                assign,
                vec![Expr::decl_ref(local, light_ty), Expr::decl_ref(source, light_ty)],
                light_ty,
            )),
            Stmt::Return(Some(Expr::member(Expr::decl_ref(local, light_ty), intensity, float))),
        ]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let names: Vec<_> = module.functions.iter().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, ["dim"]);

    let light_ir = module.find_type("Light").expect("Light is emitted");
    let (_, dim) = function(&module, "dim");
    let source = dim.params[0];
    let body = dim.body.as_ref().expect("dim has a body");
    let [Statement::Declare(local), Statement::Expr(ref assigned), Statement::Return(_)] = body[..]
    else {
        panic!("unexpected body {body:?}");
    };
    assert_eq!(dim.variables[local].init, Some(Expression::Local(source)));
    assert_eq!(
        *assigned,
        Expression::binary(BinaryOp::Assign, Expression::Local(local), Expression::Local(source))
    );
    assert_eq!(
        body[2],
        Statement::Return(Some(Expression::Field {
            base: Box::new(Expression::Local(local)),
            owner: light_ir,
            index: 0,
        }))
    );
}

#[test]
fn overloaded_operators_take_canonical_names() {
    let mut b = UnitBuilder::new();
    let float = b.builtin(BuiltinKind::Float);
    let (mass, mass_ty) = b.record(None, "Mass");
    let kg = b.field(mass, "kg", float);

    let plus = b.method(mass, "operator+", mass_ty);
    b.function_mut(plus).operator = Some(OverloadedOperator::Plus);
    let rhs = b.param(plus, "rhs", mass_ty);
    b.set_body(plus, Stmt::compound([Stmt::Return(Some(Expr::decl_ref(rhs, mass_ty)))]));

    let to_float = b.method(mass, "operator float", float);
    b.function_mut(to_float).conversion = true;
    b.set_body(
        to_float,
        Stmt::compound([Stmt::Return(Some(Expr::member(Expr::this(mass_ty), kg, float)))]),
    );

    let total = b.function(None, "total", float);
    b.annotate(total, Annotation::flag("noignore"));
    let a = b.param(total, "a", mass_ty);
    let c = b.param(total, "c", mass_ty);
    let sum = Expr::operator_call(
        plus,
        vec![Expr::decl_ref(a, mass_ty), Expr::decl_ref(c, mass_ty)],
        mass_ty,
    );
    b.set_body(
        total,
        Stmt::compound([Stmt::Return(Some(Expr::member_call(sum, to_float, Vec::new(), float)))]),
    );
    let unit = b.finish();

    let module = run(&unit).expect("translates");
    let mass_ir = module.find_type("Mass").expect("Mass is emitted");
    let (plus_ir, plus) = function(&module, "operator_plus");
    assert!(matches!(plus.kind, FunctionKind::Method { owner } if owner == mass_ir));
    assert_eq!(param_names(plus), ["rhs_0"]);
    let (cast_ir, _) = function(&module, "cast_to_float");

    let (_, total) = function(&module, "total");
    let (a, c) = (total.params[0], total.params[1]);
    assert_eq!(
        total.body,
        Some(vec![Statement::Return(Some(Expression::MethodCall {
            receiver: Box::new(Expression::MethodCall {
                receiver: Box::new(Expression::Local(a)),
                method: plus_ir,
                arguments: vec![Expression::Local(c)],
            }),
            method: cast_ir,
            arguments: Vec::new(),
        }))])
    );
}

#[test]
fn recursion_is_rejected() {
    let mut b = UnitBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let fact = b.function(None, "fact", int);
    let n = b.param(fact, "n", int);
    b.set_body(
        fact,
        Stmt::compound([Stmt::Return(Some(Expr::call(
            fact,
            vec![Expr::decl_ref(n, int)],
            int,
        )))]),
    );
    b.annotate(fact, Annotation::flag("noignore"));
    let unit = b.finish();

    let err = run(&unit).expect_err("recursion is not translatable");
    assert!(
        matches!(err, TranslateError::RecursiveCall { ref name, .. } if name == "fact"),
        "{err}"
    );
}

#[test]
fn compute_entries_reject_plain_parameters() {
    let mut b = UnitBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let main = compute_entry(&mut b, "main", compute());
    b.param(main, "count", int);
    let unit = b.finish();

    let err = run(&unit).expect_err("plain parameter on a compute entry");
    assert!(matches!(err, TranslateError::ContractViolation { .. }), "{err}");
}

#[test]
fn json_fixture_translates() {
    let text = include_str!("../../../testdata/scale_kernel.json");
    let unit = Unit::from_json(text).expect("fixture parses");
    let module = run(&unit).expect("fixture translates");

    let (scale_ir, scale) = function(&module, "scale");
    assert_eq!(param_names(scale), ["a_0", "x_1"]);
    // A const by-value parameter carries no qualifier.
    assert_eq!(scale.variables[scale.params[0]].qualifier, Qualifier::None);

    let (entry_ir, entry) = function(&module, "cs_main");
    assert_eq!(
        entry.attrs,
        [Attribute::Stage(ShaderStage::Compute), Attribute::KernelSize([64, 1, 1])]
    );

    let (_, ns) = module.namespaces.iter().next().expect("kernels namespace");
    assert_eq!(ns.name, "kernels");
    assert_eq!(ns.functions, [scale_ir, entry_ir]);

    let dump = dump_module(&module);
    assert!(dump.contains("@stage(compute) @kernel_size(64, 1, 1)"), "{dump}");
    assert!(dump.contains("@semantic(ThreadID)"), "{dump}");
}
