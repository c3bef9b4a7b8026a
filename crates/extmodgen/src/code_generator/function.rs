//! Emission of functions, methods and constructors
//!
//! The C entry point, its argument unpacking and the function-object macro are
//! all chosen by the [`CallConvention`] of the function.

use log::debug;

use super::{constants, context::EmitContext, templates};
use crate::{
    comment,
    descriptor::{FunctionDescriptor, FunctionKind, ParamDefault, Parameter},
    error::Result,
    literal::{self, DeclKind, LiteralValue},
    signature::CallConvention,
};

/// Emit prototype comment, implementation skeleton and function object.
pub(crate) fn emit_function(ctx: &mut EmitContext<'_>, function: &FunctionDescriptor) -> Result<()> {
    if let FunctionKind::Constructor { class } = &function.kind {
        // Validate the shape before any text is written.
        let convention = function.call_convention()?;
        let tuple_defaults = emit_tuple_defaults(ctx, function);
        emit_preamble(ctx, function)?;
        emit_constructor(ctx, function, class, convention, &tuple_defaults);
        return Ok(());
    }

    let convention = function.binding_convention()?;
    debug!(
        "Emitting {} with convention {convention}",
        function.dotted_name()
    );
    let tuple_defaults = emit_tuple_defaults(ctx, function);
    emit_preamble(ctx, function)?;

    let c_name = ctx.scoped(&function.full_name());
    let receiver = bound_receiver(function);
    let body = match convention {
        CallConvention::Fixed(_) => {
            let (params, unpack) = fixed_parameters(function, receiver);
            let params = if params.is_empty() {
                "void".to_owned()
            } else {
                params.join(", ")
            };
            ctx.push(format!("STATIC mp_obj_t {c_name}({params}) {{"));
            unpack
        }
        CallConvention::VariadicBetween { .. } | CallConvention::Variadic { .. } => {
            ctx.push(format!(
                "STATIC mp_obj_t {c_name}(size_t n_args, const mp_obj_t *args) {{"
            ));
            array_unpack(function, receiver, convention, &tuple_defaults)
        }
        CallConvention::KeywordCatchAll { .. } => {
            ctx.push(format!(
                "STATIC mp_obj_t {c_name}(size_t n_args, const mp_obj_t *args, mp_map_t *kw_args) {{"
            ));
            array_unpack(function, receiver, convention, &tuple_defaults)
        }
    };
    for line in body {
        ctx.push(format!("    {line}"));
    }
    ctx.push("    // TODO");
    ctx.push(format!(
        "    return {};",
        templates::return_placeholder(function.args.returns.as_deref())
    ));
    ctx.push("}");
    ctx.push(function_object(&c_name, convention));
    ctx.blank();
    Ok(())
}

/// Receiver bound by the C entry point, with the class it belongs to
fn bound_receiver(function: &FunctionDescriptor) -> Option<(&str, &str)> {
    match (&function.kind, &function.receiver) {
        (FunctionKind::Method { class }, Some(receiver)) => Some((receiver, class)),
        _ => None,
    }
}

fn emit_preamble(ctx: &mut EmitContext<'_>, function: &FunctionDescriptor) -> Result<()> {
    ctx.push(format!("// {}", function.prototype()));
    if let Some(doc) = function.doc.as_deref()
        && comment::has_content(Some(doc))
    {
        ctx.push(comment::block_comment(doc)?);
    }
    Ok(())
}

/// Serialize tuple-valued defaults; returns the aggregate name per parameter.
fn emit_tuple_defaults(
    ctx: &mut EmitContext<'_>,
    function: &FunctionDescriptor,
) -> Vec<Option<String>> {
    let mut idents = Vec::with_capacity(function.args.params.len());
    for param in &function.args.params {
        if let Some(ParamDefault::Literal(LiteralValue::Tuple(items))) = &param.default {
            let root = ctx.scoped(&format!("{}_{}_default", function.full_name(), param.name));
            constants::emit_tuple(ctx, &root, 0, items);
            idents.push(Some(literal::decl_ident(&root, 0, 0, DeclKind::Tuple)));
        } else {
            idents.push(None);
        }
    }
    idents
}

fn fixed_parameters(
    function: &FunctionDescriptor,
    receiver: Option<(&str, &str)>,
) -> (Vec<String>, Vec<String>) {
    let mut params = Vec::new();
    let mut unpack = Vec::new();
    if let Some((receiver, class)) = receiver {
        params.push(format!("mp_obj_t {receiver}_in"));
        unpack.push(receiver_cast(receiver, class, &format!("{receiver}_in")));
    }
    for param in &function.args.params {
        let annotation = param.annotation.as_deref();
        if templates::converts(annotation) {
            let source = format!("{}_in", param.name);
            params.push(format!("mp_obj_t {source}"));
            unpack.extend(templates::unpack_lines(&param.name, annotation, &source));
        } else {
            params.push(format!("mp_obj_t {}", param.name));
        }
    }
    (params, unpack)
}

/// Unpack lines for entry points that receive `n_args`/`args`.
fn array_unpack(
    function: &FunctionDescriptor,
    receiver: Option<(&str, &str)>,
    convention: CallConvention,
    tuple_defaults: &[Option<String>],
) -> Vec<String> {
    let mut unpack = Vec::new();
    let offset = usize::from(receiver.is_some());
    if let Some((receiver, class)) = receiver {
        unpack.push(receiver_cast(receiver, class, "args[0]"));
    }
    unpack.extend(parameter_unpack(
        &function.args.params,
        offset,
        convention.min_args(),
        tuple_defaults,
    ));
    unpack.extend(catch_all_notes(function, function.args.params.len() + offset));
    unpack
}

fn parameter_unpack(
    params: &[Parameter],
    offset: usize,
    required: usize,
    tuple_defaults: &[Option<String>],
) -> Vec<String> {
    let mut unpack = Vec::new();
    for (i, param) in params.iter().enumerate() {
        let position = i + offset;
        let source = if position < required {
            format!("args[{position}]")
        } else {
            let fallback = default_object(
                param.default.as_ref(),
                tuple_defaults.get(i).and_then(Option::as_deref),
            );
            format!("(n_args > {position}) ? args[{position}] : {fallback}")
        };
        unpack.extend(templates::unpack_lines(
            &param.name,
            param.annotation.as_deref(),
            &source,
        ));
    }
    unpack
}

fn catch_all_notes(function: &FunctionDescriptor, first_extra: usize) -> Vec<String> {
    let mut notes = Vec::new();
    if let Some(varargs) = &function.args.varargs {
        notes.push(format!(
            "// *{varargs}: args[{first_extra}] .. args[n_args - 1]"
        ));
    }
    if let Some(varkw) = &function.args.varkw {
        notes.push(format!("// **{varkw}: kw_args"));
    }
    notes
}

fn receiver_cast(receiver: &str, class: &str, source: &str) -> String {
    format!("mp_obj_{class}_t *{receiver} = MP_OBJ_TO_PTR({source});")
}

/// Object expression used when an optional argument is omitted
fn default_object(default: Option<&ParamDefault>, tuple_ident: Option<&str>) -> String {
    match default {
        Some(ParamDefault::Literal(value)) => match value {
            LiteralValue::None => "mp_const_none".to_owned(),
            LiteralValue::Bool(true) => "mp_const_true".to_owned(),
            LiteralValue::Bool(false) => "mp_const_false".to_owned(),
            LiteralValue::Int(value) => format!("MP_OBJ_NEW_SMALL_INT({value})"),
            LiteralValue::Float(value) => {
                format!("mp_obj_new_float({})", literal::c_float_literal(*value))
            }
            LiteralValue::Str(value) => format!(
                "mp_obj_new_str(\"{}\", {})",
                literal::c_string_escape(value),
                value.len()
            ),
            LiteralValue::Tuple(_) => tuple_ident.map_or_else(
                || "mp_const_empty_tuple".to_owned(),
                |ident| format!("MP_OBJ_FROM_PTR(&{ident})"),
            ),
        },
        Some(ParamDefault::Opaque(_)) | None => "mp_const_none".to_owned(),
    }
}

/// `MP_DEFINE_CONST_FUN_OBJ_*` registration for `c_name`
pub(crate) fn function_object(c_name: &str, convention: CallConvention) -> String {
    match convention {
        CallConvention::Fixed(n) => {
            format!("STATIC MP_DEFINE_CONST_FUN_OBJ_{n}({c_name}_obj, {c_name});")
        }
        CallConvention::VariadicBetween { min, max } => format!(
            "STATIC MP_DEFINE_CONST_FUN_OBJ_VAR_BETWEEN({c_name}_obj, {min}, {max}, {c_name});"
        ),
        CallConvention::Variadic { min } => {
            format!("STATIC MP_DEFINE_CONST_FUN_OBJ_VAR({c_name}_obj, {min}, {c_name});")
        }
        CallConvention::KeywordCatchAll { min } => {
            format!("STATIC MP_DEFINE_CONST_FUN_OBJ_KW({c_name}_obj, {min}, {c_name});")
        }
    }
}

/// `mp_arg_check_num` guard for a constructor with `convention`
pub(crate) fn constructor_guard(convention: CallConvention) -> String {
    let min = convention.min_args();
    let max = convention
        .max_args()
        .map_or_else(|| templates::UNBOUNDED_ARGS.to_owned(), |max| max.to_string());
    format!(
        "mp_arg_check_num(n_args, n_kw, {min}, {max}, {});",
        convention.takes_keywords()
    )
}

fn emit_constructor(
    ctx: &mut EmitContext<'_>,
    function: &FunctionDescriptor,
    class: &str,
    convention: CallConvention,
    tuple_defaults: &[Option<String>],
) {
    let instance = function.receiver.as_deref().unwrap_or("self");
    let c_name = ctx.scoped(&format!("{class}_make_new"));
    ctx.push(format!(
        "STATIC mp_obj_t {c_name}(const mp_obj_type_t *type, size_t n_args, size_t n_kw, const mp_obj_t *args) {{"
    ));
    ctx.push(format!("    {}", constructor_guard(convention)));
    let mut body = parameter_unpack(
        &function.args.params,
        0,
        convention.min_args(),
        tuple_defaults,
    );
    body.extend(catch_all_notes(function, function.args.params.len()));
    for line in body {
        ctx.push(format!("    {line}"));
    }
    ctx.push(format!(
        "    mp_obj_{class}_t *{instance} = m_new_obj(mp_obj_{class}_t);"
    ));
    ctx.push(format!("    {instance}->base.type = type;"));
    ctx.push(format!("    return MP_OBJ_FROM_PTR({instance});"));
    ctx.push("}");
    ctx.blank();
}
