//! Emission of Python classes as MicroPython types

use log::debug;

use super::{constants, context::EmitContext, function};
use crate::{comment, descriptor::ClassDescriptor, error::Result};

pub(crate) fn emit_class(ctx: &mut EmitContext<'_>, class: &ClassDescriptor) -> Result<()> {
    let name = &class.name;
    debug!(
        "Emitting class {name} with {} methods and {} constants",
        class.methods.len(),
        class.defines.len()
    );
    if !class.vars.is_empty() {
        debug!(
            "Class {name} has {} non-constant attributes without C counterpart",
            class.vars.len()
        );
    }

    ctx.push(format!(
        "// class {name}({}):",
        comment::collapse_whitespace(&class.bases.join(", "))
    ));
    if let Some(doc) = class.doc.as_deref()
        && comment::has_content(Some(doc))
    {
        ctx.push(comment::block_comment(doc)?);
    }
    ctx.push(format!("typedef struct _mp_obj_{name}_t {{"));
    ctx.push("    mp_obj_base_t base;");
    ctx.push(format!("}} mp_obj_{name}_t;"));
    ctx.blank();

    if !class.defines.is_empty() {
        ctx.push(format!("// {name} constants"));
        for (index, define) in class.defines.iter().enumerate() {
            constants::emit_define(ctx, define, index);
        }
        ctx.ensure_blank();
    }

    if !class.methods.is_empty() {
        ctx.push(format!("// Defining {name} methods"));
    }
    for method in &class.methods {
        function::emit_function(ctx, method)?;
    }

    let print = ctx.scoped(&format!("{name}_print"));
    ctx.push(format!(
        "STATIC void {print}(const mp_print_t *print, mp_obj_t self_in, mp_print_kind_t kind) {{"
    ));
    ctx.push("    (void)kind;");
    ctx.push(format!("    mp_obj_{name}_t *self = MP_OBJ_TO_PTR(self_in);"));
    ctx.push(format!("    mp_printf(print, \"<{name} object at %p>\", self);"));
    ctx.push("}");
    ctx.blank();

    let locals = ctx.scoped(&format!("{name}_locals_dict"));
    ctx.push(format!("// {name} stuff"));
    ctx.push(format!(
        "STATIC const mp_rom_map_elem_t {locals}_table[] = {{"
    ));
    for method in class.methods.iter().filter(|m| !m.is_constructor()) {
        let object = ctx.scoped(&format!("{}_obj", method.full_name()));
        ctx.push(format!(
            "    {{ MP_ROM_QSTR(MP_QSTR_{}), MP_ROM_PTR(&{object}) }},",
            method.name
        ));
    }
    constants::register_defines(ctx, &class.defines);
    ctx.push("};");
    ctx.push(format!(
        "STATIC MP_DEFINE_CONST_DICT({locals}, {locals}_table);"
    ));
    ctx.blank();

    let type_name = ctx.scoped(&format!("{name}_type"));
    ctx.push(format!("STATIC const mp_obj_type_t {type_name} = {{"));
    ctx.push("    { &mp_type_type },");
    ctx.push(format!("    .name = MP_QSTR_{name},"));
    ctx.push(format!("    .print = {print},"));
    if class.constructor().is_some() {
        let make_new = ctx.scoped(&format!("{name}_make_new"));
        ctx.push(format!("    .make_new = {make_new},"));
    }
    ctx.push(format!("    .locals_dict = (void*)&{locals},"));
    ctx.push("};");
    ctx.blank();
    Ok(())
}
