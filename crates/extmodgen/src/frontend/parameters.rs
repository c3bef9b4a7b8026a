//! Argument list extraction from `def` statements

use log::warn;
use ruff_python_ast::{self as ast, Expr};
use ruff_text_size::Ranged;

use super::evaluator::{self, Bindings};
use crate::{
    comment::collapse_whitespace,
    descriptor::{ArgumentSpec, ParamDefault, Parameter},
};

/// Reflect the parameters of `func_def`; `dotted` names it in diagnostics.
///
/// Positional-only and regular parameters form one positional list. Defaults
/// that fold to a constant become literals; anything else keeps its source
/// text.
pub(crate) fn argument_spec(
    dotted: &str,
    func_def: &ast::StmtFunctionDef,
    source: &str,
    scopes: &[&Bindings],
) -> ArgumentSpec {
    let parameters = &func_def.parameters;
    if !parameters.kwonlyargs.is_empty() {
        let names: Vec<&str> = parameters
            .kwonlyargs
            .iter()
            .map(|param| param.parameter.name.as_str())
            .collect();
        warn!(
            "Ignoring keyword-only parameters of {dotted}: {}",
            names.join(", ")
        );
    }

    let params = parameters
        .posonlyargs
        .iter()
        .chain(&parameters.args)
        .map(|param| {
            let mut reflected = Parameter::new(param.parameter.name.as_str());
            reflected.annotation = param
                .parameter
                .annotation
                .as_deref()
                .map(|annotation| annotation_text(annotation, source));
            reflected.default = param
                .default
                .as_deref()
                .map(|default| default_value(default, source, scopes));
            reflected
        })
        .collect();

    ArgumentSpec {
        params,
        varargs: parameters
            .vararg
            .as_ref()
            .map(|vararg| vararg.name.to_string()),
        varkw: parameters.kwarg.as_ref().map(|kwarg| kwarg.name.to_string()),
        returns: func_def
            .returns
            .as_deref()
            .map(|returns| annotation_text(returns, source)),
    }
}

/// Detach the receiver (the first positional parameter) of a method.
pub(crate) fn take_receiver(args: &mut ArgumentSpec) -> Option<String> {
    if args.params.is_empty() {
        return None;
    }
    Some(args.params.remove(0).name)
}

/// True for `@staticmethod`, which binds no receiver
pub(crate) fn is_static_method(func_def: &ast::StmtFunctionDef) -> bool {
    func_def.decorator_list.iter().any(|decorator| {
        matches!(&decorator.expression, Expr::Name(name) if name.id.as_str() == "staticmethod")
    })
}

/// Decorator that turns a method into something other than a plain function,
/// such as `@classmethod`, `@property` or `@value.setter`
pub(crate) fn descriptor_decorator(func_def: &ast::StmtFunctionDef) -> Option<&str> {
    func_def
        .decorator_list
        .iter()
        .find_map(|decorator| match &decorator.expression {
            Expr::Name(name) if matches!(name.id.as_str(), "classmethod" | "property") => {
                Some(name.id.as_str())
            }
            Expr::Attribute(attribute)
                if matches!(attribute.attr.as_str(), "setter" | "getter" | "deleter") =>
            {
                Some(attribute.attr.as_str())
            }
            _ => None,
        })
}

/// Annotation as written on one line; quoted forward references are unquoted.
fn annotation_text(annotation: &Expr, source: &str) -> String {
    match annotation {
        Expr::StringLiteral(string_lit) => collapse_whitespace(string_lit.value.to_str()),
        other => collapse_whitespace(&source[other.range()]),
    }
}

fn default_value(default: &Expr, source: &str, scopes: &[&Bindings]) -> ParamDefault {
    evaluator::evaluate(default, scopes).map_or_else(
        |_| ParamDefault::Opaque(collapse_whitespace(&source[default.range()])),
        ParamDefault::Literal,
    )
}
