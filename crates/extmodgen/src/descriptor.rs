//! Statically-typed description of a reflected Python module
//!
//! The front-end builds these once from the parsed source; the code generator
//! only ever reads them.

use std::fmt;

use crate::{
    comment::collapse_whitespace,
    error::Result,
    literal::LiteralValue,
    signature::{self, CallConvention},
};

/// Name used by Python for instance initializers
pub const CONSTRUCTOR_NAME: &str = "__init__";

/// Default value attached to a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    /// A value the constant evaluator could reduce to a literal
    Literal(LiteralValue),
    /// Any other expression, kept as its source text
    Opaque(String),
}

impl fmt::Display for ParamDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDefault::Literal(value) => write!(f, "{}", value.python_repr()),
            ParamDefault::Opaque(source) => f.write_str(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Source text of the annotation, e.g. `int` or `None`
    pub annotation: Option<String>,
    pub default: Option<ParamDefault>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Reflected argument list of a function, receiver excluded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSpec {
    pub params: Vec<Parameter>,
    /// Name of the `*args` catch-all
    pub varargs: Option<String>,
    /// Name of the `**kwargs` catch-all
    pub varkw: Option<String>,
    pub returns: Option<String>,
}

impl ArgumentSpec {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn default_count(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionKind {
    /// Module-level function
    Function,
    /// Ordinary method of `class`
    Method { class: String },
    /// The `__init__` of `class`, emitted as the type's allocator
    Constructor { class: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub kind: FunctionKind,
    pub args: ArgumentSpec,
    /// Name of the stripped receiver parameter, usually `self`
    pub receiver: Option<String>,
    pub doc: Option<String>,
}

impl FunctionDescriptor {
    pub fn function(name: impl Into<String>, args: ArgumentSpec) -> Self {
        Self {
            name: name.into(),
            kind: FunctionKind::Function,
            args,
            receiver: None,
            doc: None,
        }
    }

    /// Build a method descriptor; `__init__` becomes the class constructor.
    pub fn method(
        class: impl Into<String>,
        name: impl Into<String>,
        receiver: Option<String>,
        args: ArgumentSpec,
    ) -> Self {
        let name = name.into();
        let class = class.into();
        let kind = if name == CONSTRUCTOR_NAME {
            FunctionKind::Constructor { class }
        } else {
            FunctionKind::Method { class }
        };
        Self {
            name,
            kind,
            args,
            receiver,
            doc: None,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn class_name(&self) -> Option<&str> {
        match &self.kind {
            FunctionKind::Function => None,
            FunctionKind::Method { class } | FunctionKind::Constructor { class } => Some(class),
        }
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Constructor { .. })
    }

    /// `Class_name` for methods, `name` otherwise
    pub fn full_name(&self) -> String {
        match self.class_name() {
            Some(class) => format!("{class}_{}", self.name),
            None => self.name.clone(),
        }
    }

    /// `Class.name` for methods, `name` otherwise
    pub fn dotted_name(&self) -> String {
        match self.class_name() {
            Some(class) => format!("{class}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Convention of the reflected argument list, receiver excluded.
    pub fn call_convention(&self) -> Result<CallConvention> {
        signature::classify(&self.dotted_name(), &self.args)
    }

    /// Convention of the C entry point registered with the runtime.
    ///
    /// Methods receive their instance as the first positional argument, so the
    /// receiver is counted again here.
    pub fn binding_convention(&self) -> Result<CallConvention> {
        let convention = self.call_convention()?;
        Ok(match (&self.kind, &self.receiver) {
            (FunctionKind::Method { .. }, Some(_)) => convention.with_receiver(),
            _ => convention,
        })
    }

    /// Python prototype on one line, e.g. `def f(a: int, b=1, *args) -> str`
    pub fn prototype(&self) -> String {
        let mut args: Vec<String> = Vec::new();
        if let Some(receiver) = &self.receiver {
            args.push(receiver.clone());
        }
        for param in &self.args.params {
            let mut rendered = param.name.clone();
            if let Some(annotation) = &param.annotation {
                rendered.push_str(": ");
                rendered.push_str(annotation);
            }
            if let Some(default) = &param.default {
                rendered.push('=');
                rendered.push_str(&default.to_string());
            }
            args.push(rendered);
        }
        if let Some(varargs) = &self.args.varargs {
            args.push(format!("*{varargs}"));
        }
        if let Some(varkw) = &self.args.varkw {
            args.push(format!("**{varkw}"));
        }
        let mut prototype = format!("def {}({})", self.dotted_name(), args.join(", "));
        if let Some(returns) = &self.args.returns {
            prototype.push_str(" -> ");
            prototype.push_str(returns);
        }
        collapse_whitespace(&prototype)
    }
}

/// A constant-like value bound at module or class level
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantBinding {
    pub name: String,
    pub class: Option<String>,
    pub value: LiteralValue,
}

impl ConstantBinding {
    pub fn new(name: impl Into<String>, value: LiteralValue) -> Self {
        Self {
            name: name.into(),
            class: None,
            value,
        }
    }

    #[must_use]
    pub fn in_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// C-level root name: `Class_NAME` for class constants, `NAME` otherwise
    pub fn full_name(&self) -> String {
        match &self.class {
            Some(class) => format!("{class}_{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Uppercase bindings are registered constants; the rest are variables.
    pub fn is_define(&self) -> bool {
        is_define_name(&self.name)
    }
}

pub fn is_define_name(name: &str) -> bool {
    name == name.to_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub bases: Vec<String>,
    pub doc: Option<String>,
    pub methods: Vec<FunctionDescriptor>,
    pub defines: Vec<ConstantBinding>,
    pub vars: Vec<ConstantBinding>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn constructor(&self) -> Option<&FunctionDescriptor> {
        self.methods.iter().find(|m| m.is_constructor())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub author: String,
    pub doc: Option<String>,
    pub functions: Vec<FunctionDescriptor>,
    pub classes: Vec<ClassDescriptor>,
    pub defines: Vec<ConstantBinding>,
    pub vars: Vec<ConstantBinding>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(names: &[&str]) -> ArgumentSpec {
        ArgumentSpec {
            params: names.iter().map(|n| Parameter::new(*n)).collect(),
            ..ArgumentSpec::default()
        }
    }

    #[test]
    fn test_init_becomes_constructor() {
        let init = FunctionDescriptor::method("Foo", "__init__", Some("self".into()), spec(&[]));
        assert!(init.is_constructor());
        assert_eq!(init.class_name(), Some("Foo"));

        let other = FunctionDescriptor::method("Foo", "bar", Some("self".into()), spec(&[]));
        assert!(!other.is_constructor());
    }

    #[test]
    fn test_prototype_rendering() {
        let mut args = spec(&["a", "b"]);
        args.params[0].annotation = Some("int".into());
        args.params[1].default = Some(ParamDefault::Literal(LiteralValue::Int(1)));
        args.varargs = Some("args".into());
        args.returns = Some("str".into());
        let f = FunctionDescriptor::method("Foo", "bar", Some("self".into()), args);
        assert_eq!(
            f.prototype(),
            "def Foo.bar(self, a: int, b=1, *args) -> str"
        );
    }

    #[test]
    fn test_prototype_stays_on_one_line() {
        let mut args = spec(&["x", "y"]);
        args.params[0].default = Some(ParamDefault::Opaque("[\n    1,\n]".into()));
        args.params[1].annotation = Some("dict[\n    str, int\n]".into());
        let f = FunctionDescriptor::function("f", args);
        assert_eq!(f.prototype(), "def f(x=[ 1, ], y: dict[ str, int ])");
    }

    #[test]
    fn test_method_binding_counts_receiver() {
        let f = FunctionDescriptor::method("Foo", "bar", Some("self".into()), spec(&["a"]));
        assert_eq!(f.call_convention().unwrap(), CallConvention::Fixed(1));
        assert_eq!(f.binding_convention().unwrap(), CallConvention::Fixed(2));

        let init = FunctionDescriptor::method("Foo", "__init__", Some("self".into()), spec(&["a"]));
        assert_eq!(init.binding_convention().unwrap(), CallConvention::Fixed(1));
    }

    #[test]
    fn test_define_detection() {
        assert!(ConstantBinding::new("CONST_1", LiteralValue::None).is_define());
        assert!(!ConstantBinding::new("value", LiteralValue::None).is_define());
        assert_eq!(
            ConstantBinding::new("X", LiteralValue::Int(1))
                .in_class("Foo")
                .full_name(),
            "Foo_X"
        );
    }
}
