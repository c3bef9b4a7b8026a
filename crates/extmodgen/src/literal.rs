//! Literal values and their serialization into ROM declarations
//!
//! `None`, booleans and small integers are encoded inline in a `mp_rom_obj_t`.
//! Strings and floats need a named object, and tuples are flattened bottom-up
//! so that every aggregate follows the declarations it points at.

use std::{borrow::Cow, fmt::Write};

/// A constant value of one of the supported Python kinds
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<LiteralValue>),
}

impl LiteralValue {
    /// Python type name of the value
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::None => "NoneType",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Str(_) => "str",
            LiteralValue::Tuple(_) => "tuple",
        }
    }

    /// Inline ROM encoding; `None` for kinds that need a named object
    pub fn rom_inline(&self) -> Option<String> {
        match self {
            LiteralValue::None => Some("MP_ROM_NONE".to_owned()),
            LiteralValue::Bool(true) => Some("MP_ROM_TRUE".to_owned()),
            LiteralValue::Bool(false) => Some("MP_ROM_FALSE".to_owned()),
            LiteralValue::Int(value) => Some(format!("MP_ROM_INT({value})")),
            LiteralValue::Float(_) | LiteralValue::Str(_) | LiteralValue::Tuple(_) => None,
        }
    }

    /// Python `repr()` of the value
    pub fn python_repr(&self) -> String {
        match self {
            LiteralValue::None => "None".to_owned(),
            LiteralValue::Bool(true) => "True".to_owned(),
            LiteralValue::Bool(false) => "False".to_owned(),
            LiteralValue::Int(value) => value.to_string(),
            LiteralValue::Float(value) => python_float_repr(*value),
            LiteralValue::Str(value) => python_str_repr(value),
            LiteralValue::Tuple(items) => match items.as_slice() {
                [single] => format!("({},)", single.python_repr()),
                _ => {
                    let inner: Vec<String> = items.iter().map(Self::python_repr).collect();
                    format!("({})", inner.join(", "))
                }
            },
        }
    }
}

/// Kind of named ROM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Str,
    Float,
    Tuple,
}

impl DeclKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            DeclKind::Str => "str",
            DeclKind::Float => "float",
            DeclKind::Tuple => "tuple",
        }
    }
}

/// One named declaration produced by the serializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedDecl {
    pub ident: String,
    pub kind: DeclKind,
    /// C source, possibly spanning several lines
    pub text: String,
}

/// `{root}_{level}_{index}_{kind}_obj`
pub fn decl_ident(root: &str, level: usize, index: usize, kind: DeclKind) -> String {
    format!("{root}_{level}_{index}_{}_obj", kind.suffix())
}

/// Declaration of a standalone string object named `ident`
pub fn str_decl(ident: &str, value: &str) -> String {
    format!(
        "STATIC const MP_DEFINE_STR_OBJ({ident}, \"{}\");",
        c_string_escape(value)
    )
}

/// Declaration of a standalone float object named `ident`
pub fn float_decl(ident: &str, value: f64) -> String {
    format!(
        "STATIC const MP_DEFINE_FLOAT_OBJ({ident}, {});",
        c_float_literal(value)
    )
}

/// Flatten the tuple bound to `root` at position `index` into declarations.
///
/// The last declaration is the top-level aggregate, named
/// `{root}_0_{index}_tuple_obj`.
pub fn serialize_tuple(root: &str, index: usize, items: &[LiteralValue]) -> Vec<EmittedDecl> {
    let mut decls = Vec::new();
    serialize_node(root, 0, index, items, &mut decls);
    decls
}

fn serialize_node(
    root: &str,
    level: usize,
    index: usize,
    items: &[LiteralValue],
    decls: &mut Vec<EmittedDecl>,
) {
    // Below the top level, children are scoped by their parent's stem so that
    // sibling tuples cannot produce the same child names.
    let child_root: Cow<'_, str> = if level == 0 {
        Cow::Borrowed(root)
    } else {
        Cow::Owned(format!("{root}_{level}_{index}"))
    };

    for (i, item) in items.iter().enumerate() {
        if let LiteralValue::Tuple(children) = item {
            serialize_node(&child_root, level + 1, i, children, decls);
        }
    }

    for (i, item) in items.iter().enumerate() {
        match item {
            LiteralValue::Str(value) => {
                let ident = decl_ident(&child_root, level, i, DeclKind::Str);
                let text = str_decl(&ident, value);
                decls.push(EmittedDecl {
                    ident,
                    kind: DeclKind::Str,
                    text,
                });
            }
            LiteralValue::Float(value) => {
                let ident = decl_ident(&child_root, level, i, DeclKind::Float);
                let text = float_decl(&ident, *value);
                decls.push(EmittedDecl {
                    ident,
                    kind: DeclKind::Float,
                    text,
                });
            }
            _ => {}
        }
    }

    let ident = decl_ident(root, level, index, DeclKind::Tuple);
    let mut text = format!(
        "const mp_rom_obj_tuple_t {ident} = {{{{&mp_type_tuple}}, {}, {{",
        items.len()
    );
    for (i, item) in items.iter().enumerate() {
        let element = match item {
            LiteralValue::Str(_) => rom_ptr(&decl_ident(&child_root, level, i, DeclKind::Str)),
            LiteralValue::Float(_) => {
                rom_ptr(&decl_ident(&child_root, level, i, DeclKind::Float))
            }
            LiteralValue::Tuple(_) => {
                rom_ptr(&decl_ident(&child_root, level + 1, i, DeclKind::Tuple))
            }
            LiteralValue::None | LiteralValue::Bool(_) | LiteralValue::Int(_) => {
                item.rom_inline().unwrap_or_default()
            }
        };
        let _ = write!(text, "\n    {element},");
    }
    text.push_str("\n},};");
    decls.push(EmittedDecl {
        ident,
        kind: DeclKind::Tuple,
        text,
    });
}

fn rom_ptr(ident: &str) -> String {
    format!("MP_ROM_PTR(&{ident})")
}

/// Escape `value` for use inside a C string literal
pub fn c_string_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(escaped, "\\{:03o}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// C spelling of a float, always carrying a decimal point or exponent
pub fn c_float_literal(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_owned()
    } else if value.is_infinite() {
        if value.is_sign_negative() {
            "-INFINITY".to_owned()
        } else {
            "INFINITY".to_owned()
        }
    } else {
        format!("{value:?}")
    }
}

fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_owned();
    }
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

fn python_str_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut repr = String::with_capacity(value.len() + 2);
    repr.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => repr.push_str("\\\\"),
            '\n' => repr.push_str("\\n"),
            '\r' => repr.push_str("\\r"),
            '\t' => repr.push_str("\\t"),
            c if c == quote => {
                repr.push('\\');
                repr.push(c);
            }
            c if c.is_ascii_control() => {
                let _ = write!(repr, "\\x{:02x}", c as u32);
            }
            c => repr.push(c),
        }
    }
    repr.push(quote);
    repr
}
