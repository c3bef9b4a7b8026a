//! C source generation for a reflected module
//!
//! [`generate`] walks a [`ModuleDescriptor`] once and produces the C source
//! lines together with the interned-string table they reference. Nothing is
//! written to disk here; see [`crate::writer`].

mod class;
mod constants;
mod context;
mod function;
pub mod templates;

use context::EmitContext;
use log::{debug, info};

use crate::{
    comment,
    descriptor::ModuleDescriptor,
    error::Result,
    symbol_pool::{self, SymbolPool},
    types::ModuleFlavor,
};

/// Settings of one generation run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub flavor: ModuleFlavor,
    /// Fully rendered header comment placed at the top of the source
    pub header: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            flavor: ModuleFlavor::External,
            header: String::new(),
        }
    }
}

/// Both artifacts of a successful run, still in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub module: String,
    pub flavor: ModuleFlavor,
    pub lines: Vec<String>,
    pub symbols: Vec<String>,
}

impl GeneratedModule {
    pub fn source_file_name(&self) -> String {
        self.flavor.source_file_name(&self.module)
    }

    pub fn source_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn symbol_table(&self) -> String {
        symbol_pool::render_symbol_table(
            &self.symbols,
            &self.flavor.enable_flag(&self.module.to_uppercase()),
        )
    }
}

pub fn generate(module: &ModuleDescriptor, options: &GeneratorOptions) -> Result<GeneratedModule> {
    info!("Generating source code for module '{}'", module.name);
    let symbols = SymbolPool::default();
    let mut ctx = EmitContext::new(&module.name, options.flavor, symbols);

    ctx.push(options.header.clone());
    if let Some(doc) = module.doc.as_deref()
        && comment::has_content(Some(doc))
    {
        ctx.push(format!("{}\n", comment::block_comment(doc)?));
    }

    let enable_flag = ctx.enable_flag();
    if ctx.flavor.is_external() {
        ctx.push(format!(
            "#define {enable_flag} (1) // you may copy this line to the mpconfigport.h"
        ));
        ctx.push(format!("#if {enable_flag}"));
        ctx.blank();
        ctx.push(templates::RUNTIME_INCLUDES);
    } else {
        ctx.push(format!("#if {enable_flag}"));
    }
    ctx.blank();

    if !module.defines.is_empty() {
        ctx.push("// Module constants declarations");
        for (index, define) in module.defines.iter().enumerate() {
            constants::emit_define(&mut ctx, define, index);
        }
        ctx.ensure_blank();
    }

    if !module.vars.is_empty() {
        ctx.push("// Module variables declarations");
        for (index, var) in module.vars.iter().enumerate() {
            constants::emit_var(&mut ctx, var, index);
        }
        ctx.ensure_blank();
    }

    if !module.functions.is_empty() {
        ctx.push("// Defining module functions");
    }
    for function in &module.functions {
        function::emit_function(&mut ctx, function)?;
    }

    if !module.classes.is_empty() {
        ctx.push("// Defining classes");
    }
    for class in &module.classes {
        class::emit_class(&mut ctx, class)?;
    }

    emit_module_object(&mut ctx, module);

    let (lines, symbols) = ctx.finish();
    debug!(
        "Generated {} source entries referencing {} symbols",
        lines.len(),
        symbols.len()
    );
    Ok(GeneratedModule {
        module: module.name.clone(),
        flavor: options.flavor,
        lines,
        symbols,
    })
}

fn emit_module_object(ctx: &mut EmitContext<'_>, module: &ModuleDescriptor) {
    let globals = ctx.scoped("globals");
    let name = ctx.module;

    ctx.blank();
    ctx.push("// Set up the module properties");
    ctx.push(format!("STATIC const mp_rom_map_elem_t {globals}_table[] = {{"));
    ctx.push(format!(
        "    {{ MP_ROM_QSTR(MP_QSTR___name__), MP_ROM_QSTR(MP_QSTR_{name}) }},"
    ));
    for function in &module.functions {
        let object = ctx.scoped(&format!("{}_obj", function.name));
        ctx.push(format!(
            "    {{ MP_ROM_QSTR(MP_QSTR_{}), MP_ROM_PTR(&{object}) }},",
            function.name
        ));
    }
    for class in &module.classes {
        let type_name = ctx.scoped(&format!("{}_type", class.name));
        ctx.push(format!(
            "    {{ MP_ROM_QSTR(MP_QSTR_{}), MP_ROM_PTR(&{type_name}) }},",
            class.name
        ));
    }
    constants::register_defines(ctx, &module.defines);
    ctx.push("};");
    ctx.push(format!(
        "STATIC MP_DEFINE_CONST_DICT({globals}, {globals}_table);"
    ));
    ctx.blank();

    let cmodule = ctx.scoped("cmodule");
    ctx.push("// Define the module object");
    ctx.push(format!("const mp_obj_module_t {cmodule} = {{"));
    ctx.push("    .base = { &mp_type_module },");
    ctx.push(format!("    .globals = (mp_obj_dict_t*)&{globals},"));
    ctx.push("};");

    let enable_flag = ctx.enable_flag();
    if ctx.flavor.is_external() {
        ctx.push("// Register the module");
        ctx.push(format!(
            "MP_REGISTER_MODULE(MP_QSTR_{name}, {cmodule}, {enable_flag});"
        ));
    }
    ctx.blank();
    ctx.push(format!("#endif // {enable_flag}"));
}
