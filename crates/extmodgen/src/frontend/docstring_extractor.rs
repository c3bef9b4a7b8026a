//! Docstring extraction from statement bodies
//!
//! Modules, classes and functions all carry their docstring the same way: the
//! first statement of the body is a bare string literal expression.

use ruff_python_ast::{Expr, ModModule, Stmt};

/// Extract the docstring of a module, class or function body.
pub(crate) fn extract_docstring(body: &[Stmt]) -> Option<String> {
    if let Some(Stmt::Expr(expr_stmt)) = body.first()
        && let Expr::StringLiteral(string_lit) = expr_stmt.value.as_ref()
    {
        return Some(string_lit.value.to_str().to_owned());
    }
    None
}

/// Extract the module-level docstring from a Python module AST.
pub(crate) fn extract_module_docstring(module: &ModModule) -> Option<String> {
    extract_docstring(&module.body)
}
