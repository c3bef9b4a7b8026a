//! Static reflection of a Python module
//!
//! The module is parsed, never executed. Top-level functions, classes and
//! constant bindings are collected the way attribute lookup on the imported
//! module would see them: later bindings replace earlier ones, classes expose
//! what they inherit from classes defined earlier in the same file, and every
//! listing is sorted by name.

mod docstring_extractor;
mod evaluator;
mod parameters;

use std::{ffi::OsStr, fs, path::Path};

use anyhow::{Context, anyhow};
use log::{debug, info};
use ruff_python_ast::{self as ast, Expr, ModModule, Stmt};
use ruff_python_parser::parse_module;
use ruff_text_size::Ranged;

use self::{
    docstring_extractor::{extract_docstring, extract_module_docstring},
    evaluator::{Bindings, EvalError},
};
use crate::{
    comment,
    descriptor::{ClassDescriptor, ConstantBinding, FunctionDescriptor, ModuleDescriptor, is_define_name},
    error::{GenerateError, Result},
    literal::LiteralValue,
    types::FxIndexMap,
};

const AUTHOR_ATTRIBUTE: &str = "__author__";

/// Read and reflect the Python module at `path`.
///
/// The module name is the file stem.
pub fn read_module(path: &Path) -> anyhow::Result<ModuleDescriptor> {
    let name = path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("Cannot derive a module name from {}", path.display()))?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read module source {}", path.display()))?;
    info!("Reflecting module '{name}' from {}", path.display());
    let module = reflect_source(name, &source, path)?;
    debug!(
        "Module '{}': {} functions, {} classes, {} constants, {} variables",
        module.name,
        module.functions.len(),
        module.classes.len(),
        module.defines.len(),
        module.vars.len()
    );
    Ok(module)
}

/// Reflect `source` as module `name`; `origin` is only used in errors.
pub fn reflect_source(name: &str, source: &str, origin: &Path) -> Result<ModuleDescriptor> {
    let parsed = parse_module(source).map_err(|error| GenerateError::Parse {
        path: origin.to_path_buf(),
        message: error.to_string(),
    })?;
    ModuleReflector::new(source).reflect(name, &parsed.into_syntax())
}

/// A top-level attribute of the module
#[derive(Debug)]
enum Member {
    Function(FunctionDescriptor),
    Class(ClassDescriptor),
    Constant(LiteralValue),
}

/// A class attribute, own or inherited
#[derive(Debug, Clone)]
enum ClassMember {
    Method(FunctionDescriptor),
    Constant(LiteralValue),
}

struct ModuleReflector<'a> {
    source: &'a str,
    members: FxIndexMap<String, Member>,
    /// Constants visible to later expressions, dunders included
    constants: Bindings,
}

impl<'a> ModuleReflector<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            members: FxIndexMap::default(),
            constants: Bindings::default(),
        }
    }

    fn reflect(mut self, name: &str, module: &ModModule) -> Result<ModuleDescriptor> {
        let mut descriptor = ModuleDescriptor::new(name);
        descriptor.doc = extract_module_docstring(module);

        for stmt in &module.body {
            match stmt {
                Stmt::FunctionDef(func_def) => {
                    let function = self.reflect_function(func_def, None, &[&self.constants]);
                    self.bind(func_def.name.as_str(), Some(Member::Function(function)));
                }
                Stmt::ClassDef(class_def) => {
                    let class = self.reflect_class(class_def)?;
                    self.bind(class_def.name.as_str(), Some(Member::Class(class)));
                }
                Stmt::Assign(ast::StmtAssign { targets, value, .. }) => {
                    for target in targets {
                        self.assign(target, value)?;
                    }
                }
                Stmt::AnnAssign(ast::StmtAnnAssign {
                    target,
                    value: Some(value),
                    ..
                }) => self.assign(target, value)?,
                _ => {}
            }
        }

        if let Some(LiteralValue::Str(author)) = self.constants.get(AUTHOR_ATTRIBUTE) {
            descriptor.author.clone_from(author);
        }
        Ok(self.finish(descriptor))
    }

    fn assign(&mut self, target: &Expr, value: &Expr) -> Result<()> {
        let Expr::Name(ast::ExprName { id, .. }) = target else {
            debug!(
                "Skipping assignment to `{}`: not a plain name",
                &self.source[target.range()]
            );
            return Ok(());
        };
        let name = id.as_str();
        let value = constant_value(name, value, &[&self.constants])?;
        match value {
            Some(value) => {
                self.constants.insert(name.to_owned(), value.clone());
                self.bind(name, Some(Member::Constant(value)));
            }
            None => {
                self.constants.shift_remove(name);
                self.bind(name, None);
            }
        }
        Ok(())
    }

    /// Rebind a module attribute; `None` shadows it with a non-constant.
    fn bind(&mut self, name: &str, member: Option<Member>) {
        if !matches!(member, Some(Member::Constant(_))) {
            self.constants.shift_remove(name);
        }
        self.members.shift_remove(name);
        if is_dunder(name) {
            return;
        }
        if let Some(member) = member {
            self.members.insert(name.to_owned(), member);
        }
    }

    fn reflect_function(
        &self,
        func_def: &ast::StmtFunctionDef,
        class: Option<&str>,
        scopes: &[&Bindings],
    ) -> FunctionDescriptor {
        let name = func_def.name.as_str();
        let dotted = class.map_or_else(|| name.to_owned(), |class| format!("{class}.{name}"));
        let mut args = parameters::argument_spec(&dotted, func_def, self.source, scopes);
        let function = match class {
            None => FunctionDescriptor::function(name, args),
            Some(class) => {
                let receiver = if parameters::is_static_method(func_def) {
                    None
                } else {
                    parameters::take_receiver(&mut args)
                };
                FunctionDescriptor::method(class, name, receiver, args)
            }
        };
        match extract_docstring(&func_def.body) {
            Some(doc) => function.with_doc(doc),
            None => function,
        }
    }

    fn reflect_class(&self, class_def: &ast::StmtClassDef) -> Result<ClassDescriptor> {
        let name = class_def.name.as_str();
        let mut class = ClassDescriptor::new(name);
        class.bases = class_def
            .bases()
            .iter()
            .map(|base| comment::collapse_whitespace(&self.source[base.range()]))
            .collect();
        class.doc = extract_docstring(&class_def.body);

        let mut attributes = self.inherited_attributes(class_def, name);
        let mut own = Bindings::default();
        for stmt in &class_def.body {
            match stmt {
                Stmt::FunctionDef(func_def) => {
                    own.shift_remove(func_def.name.as_str());
                    if let Some(decorator) = parameters::descriptor_decorator(func_def) {
                        debug!(
                            "Skipping {name}.{}: @{decorator} is not a plain method",
                            func_def.name
                        );
                        attributes.shift_remove(func_def.name.as_str());
                        continue;
                    }
                    let method =
                        self.reflect_function(func_def, Some(name), &[&own, &self.constants]);
                    attributes.insert(func_def.name.to_string(), ClassMember::Method(method));
                }
                Stmt::Assign(ast::StmtAssign { targets, value, .. }) => {
                    for target in targets {
                        self.assign_class_attribute(target, value, &mut own, &mut attributes)?;
                    }
                }
                Stmt::AnnAssign(ast::StmtAnnAssign {
                    target,
                    value: Some(value),
                    ..
                }) => self.assign_class_attribute(target, value, &mut own, &mut attributes)?,
                Stmt::ClassDef(nested) => {
                    debug!("Skipping nested class {name}.{}", nested.name);
                }
                _ => {}
            }
        }

        attributes.sort_keys();
        for (attribute, member) in attributes {
            match member {
                ClassMember::Method(method) => class.methods.push(method),
                ClassMember::Constant(value) => {
                    let binding = ConstantBinding::new(attribute, value).in_class(name);
                    if binding.is_define() {
                        class.defines.push(binding);
                    } else {
                        class.vars.push(binding);
                    }
                }
            }
        }
        Ok(class)
    }

    fn assign_class_attribute(
        &self,
        target: &Expr,
        value: &Expr,
        own: &mut Bindings,
        attributes: &mut FxIndexMap<String, ClassMember>,
    ) -> Result<()> {
        let Expr::Name(ast::ExprName { id, .. }) = target else {
            return Ok(());
        };
        let name = id.as_str();
        if is_dunder(name) {
            return Ok(());
        }
        match constant_value(name, value, &[&*own, &self.constants])? {
            Some(value) => {
                own.insert(name.to_owned(), value.clone());
                attributes.insert(name.to_owned(), ClassMember::Constant(value));
            }
            None => {
                own.shift_remove(name);
                attributes.shift_remove(name);
            }
        }
        Ok(())
    }

    /// Attributes of base classes defined earlier in this module, rebound to
    /// `class`. The first base wins on conflicts, as in single-chain lookup.
    fn inherited_attributes(
        &self,
        class_def: &ast::StmtClassDef,
        class: &str,
    ) -> FxIndexMap<String, ClassMember> {
        let mut attributes = FxIndexMap::default();
        for base in class_def.bases().iter().rev() {
            let Expr::Name(ast::ExprName { id, .. }) = base else {
                continue;
            };
            let Some(Member::Class(parent)) = self.members.get(id.as_str()) else {
                continue;
            };
            debug!("Class {class} inherits from {}", parent.name);
            for method in &parent.methods {
                let mut inherited = FunctionDescriptor::method(
                    class,
                    method.name.clone(),
                    method.receiver.clone(),
                    method.args.clone(),
                );
                inherited.doc.clone_from(&method.doc);
                attributes.insert(method.name.clone(), ClassMember::Method(inherited));
            }
            for binding in parent.defines.iter().chain(&parent.vars) {
                attributes.insert(
                    binding.name.clone(),
                    ClassMember::Constant(binding.value.clone()),
                );
            }
        }
        attributes
    }

    fn finish(self, mut descriptor: ModuleDescriptor) -> ModuleDescriptor {
        let mut members = self.members;
        members.sort_keys();
        for (name, member) in members {
            match member {
                Member::Function(function) => descriptor.functions.push(function),
                Member::Class(class) => descriptor.classes.push(class),
                Member::Constant(value) => {
                    if is_define_name(&name) {
                        descriptor.defines.push(ConstantBinding::new(name, value));
                    } else {
                        descriptor.vars.push(ConstantBinding::new(name, value));
                    }
                }
            }
        }
        descriptor
    }
}

/// Fold the value bound to `name`; `None` when it is not a constant.
fn constant_value(name: &str, value: &Expr, scopes: &[&Bindings]) -> Result<Option<LiteralValue>> {
    match evaluator::evaluate(value, scopes) {
        Ok(value) => Ok(Some(value)),
        Err(EvalError::Skip(kind)) => {
            debug!("Skipping {name}: {kind} value is not a constant");
            Ok(None)
        }
        Err(EvalError::Reject(kind)) => Err(GenerateError::UnsupportedLiteralType {
            name: name.to_owned(),
            kind: kind.to_owned(),
        }),
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}
