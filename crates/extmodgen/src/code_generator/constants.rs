//! Emission of constant and variable bindings

use log::trace;

use super::{context::EmitContext, templates};
use crate::{
    descriptor::ConstantBinding,
    literal::{self, DeclKind, LiteralValue},
};

/// Emit the declaration(s) backing the define at position `index`.
pub(crate) fn emit_define(ctx: &mut EmitContext<'_>, define: &ConstantBinding, index: usize) {
    let name = define.full_name();
    trace!("Emitting constant {name} = {}", define.value.python_repr());
    match &define.value {
        LiteralValue::None | LiteralValue::Bool(_) => {
            let value = define.value.rom_inline().unwrap_or_default();
            ctx.push(format!("STATIC const mp_rom_obj_t {name} = {value};"));
        }
        LiteralValue::Int(value) => {
            ctx.push(format!("STATIC const mp_int_t {name} = {value};"));
        }
        LiteralValue::Str(value) => {
            ctx.push(literal::str_decl(&format!("{name}_str_obj"), value));
        }
        LiteralValue::Float(value) => {
            ctx.push(literal::float_decl(&format!("{name}_float_obj"), *value));
        }
        LiteralValue::Tuple(items) => emit_tuple(ctx, &name, index, items),
    }
}

/// Emit a serialized tuple surrounded by blank separators.
pub(crate) fn emit_tuple(ctx: &mut EmitContext<'_>, root: &str, index: usize, items: &[LiteralValue]) {
    ctx.ensure_blank();
    for decl in literal::serialize_tuple(root, index, items) {
        ctx.push(decl.text);
    }
    ctx.blank();
}

/// Registration table entry for the define at position `index`.
pub(crate) fn register_define(define: &ConstantBinding, index: usize) -> String {
    let name = define.full_name();
    let value = match &define.value {
        LiteralValue::Str(_) => format!("MP_ROM_PTR(&{name}_str_obj)"),
        LiteralValue::Float(_) => format!("MP_ROM_PTR(&{name}_float_obj)"),
        LiteralValue::Tuple(_) => format!(
            "MP_ROM_PTR(&{})",
            literal::decl_ident(&name, 0, index, DeclKind::Tuple)
        ),
        other => other.rom_inline().unwrap_or_default(),
    };
    format!(
        "    {{ MP_ROM_QSTR(MP_QSTR_{}), {value} }},",
        define.name
    )
}

pub(crate) fn register_defines(ctx: &mut EmitContext<'_>, defines: &[ConstantBinding]) {
    for (index, define) in defines.iter().enumerate() {
        ctx.push(register_define(define, index));
    }
}

/// Emit a static C variable for a lowercase binding.
pub(crate) fn emit_var(ctx: &mut EmitContext<'_>, var: &ConstantBinding, index: usize) {
    let name = var.full_name();
    let c_type = templates::variable_c_type(var.value.kind_name());
    let value = match &var.value {
        LiteralValue::None => "mp_const_none".to_owned(),
        LiteralValue::Bool(value) => value.to_string(),
        LiteralValue::Int(value) => value.to_string(),
        LiteralValue::Float(value) => literal::c_float_literal(*value),
        LiteralValue::Str(value) => format!("\"{}\"", literal::c_string_escape(value)),
        LiteralValue::Tuple(items) => {
            emit_tuple(ctx, &name, index, items);
            format!(
                "MP_OBJ_FROM_PTR(&{})",
                literal::decl_ident(&name, 0, index, DeclKind::Tuple)
            )
        }
    };
    // `const char *` already ends with the pointer marker
    let separator = if c_type.ends_with('*') { "" } else { " " };
    ctx.push(format!("static {c_type}{separator}{name}\t= {value};"));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{symbol_pool::SymbolPool, types::ModuleFlavor};

    fn ctx() -> EmitContext<'static> {
        EmitContext::new("example", ModuleFlavor::External, SymbolPool::default())
    }

    #[test]
    fn test_scalar_defines() {
        let mut ctx = ctx();
        emit_define(&mut ctx, &ConstantBinding::new("CONST_NONE", LiteralValue::None), 0);
        emit_define(&mut ctx, &ConstantBinding::new("CONST_INT", LiteralValue::Int(2)), 1);
        emit_define(
            &mut ctx,
            &ConstantBinding::new("CONST_STR", LiteralValue::Str("333444".into())),
            2,
        );
        emit_define(
            &mut ctx,
            &ConstantBinding::new("CONST3", LiteralValue::Float(2.2)).in_class("Class"),
            3,
        );
        assert_eq!(
            ctx.lines(),
            &[
                "STATIC const mp_rom_obj_t CONST_NONE = MP_ROM_NONE;",
                "STATIC const mp_int_t CONST_INT = 2;",
                "STATIC const MP_DEFINE_STR_OBJ(CONST_STR_str_obj, \"333444\");",
                "STATIC const MP_DEFINE_FLOAT_OBJ(Class_CONST3_float_obj, 2.2);",
            ]
        );
    }

    #[test]
    fn test_tuple_define_is_separated_by_blank_lines() {
        let mut ctx = ctx();
        ctx.push("// Module constants declarations");
        let tuple = LiteralValue::Tuple(vec![LiteralValue::Int(1), LiteralValue::Str("x".into())]);
        emit_define(&mut ctx, &ConstantBinding::new("T", tuple), 2);
        let lines = ctx.lines();
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "STATIC const MP_DEFINE_STR_OBJ(T_0_1_str_obj, \"x\");");
        assert!(lines[3].starts_with("const mp_rom_obj_tuple_t T_0_2_tuple_obj"));
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_register_defines() {
        let tuple = LiteralValue::Tuple(vec![LiteralValue::None]);
        assert_eq!(
            register_define(&ConstantBinding::new("ONE_BOOL", LiteralValue::Bool(true)), 0),
            "    { MP_ROM_QSTR(MP_QSTR_ONE_BOOL), MP_ROM_TRUE },"
        );
        assert_eq!(
            register_define(&ConstantBinding::new("CONST_INT", LiteralValue::Int(4)), 1),
            "    { MP_ROM_QSTR(MP_QSTR_CONST_INT), MP_ROM_INT(4) },"
        );
        assert_eq!(
            register_define(&ConstantBinding::new("C", LiteralValue::Str("s".into())).in_class("K"), 2),
            "    { MP_ROM_QSTR(MP_QSTR_C), MP_ROM_PTR(&K_C_str_obj) },"
        );
        assert_eq!(
            register_define(&ConstantBinding::new("CONST_TUPLE", tuple), 5),
            "    { MP_ROM_QSTR(MP_QSTR_CONST_TUPLE), MP_ROM_PTR(&CONST_TUPLE_0_5_tuple_obj) },"
        );
    }

    #[test]
    fn test_variables() {
        let mut ctx = ctx();
        emit_var(&mut ctx, &ConstantBinding::new("count", LiteralValue::Int(3)), 0);
        emit_var(&mut ctx, &ConstantBinding::new("label", LiteralValue::Str("a\"b".into())), 1);
        emit_var(&mut ctx, &ConstantBinding::new("flag", LiteralValue::Bool(false)), 2);
        assert_eq!(
            ctx.lines(),
            &[
                "static mp_int_t count\t= 3;",
                "static const char *label\t= \"a\\\"b\";",
                "static bool flag\t= false;",
            ]
        );
    }
}
