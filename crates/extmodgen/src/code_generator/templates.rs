//! Fixed text blocks and annotation-to-C mappings

/// License header used when no custom template is configured
pub const DEFAULT_HEADER_TEMPLATE: &str = r"/*
 * This file is part of the MicroPython project, http://micropython.org/
 *
 * The MIT License (MIT)
 *
 * Copyright (c) {year} {author}
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the 'Software'), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED 'AS IS', WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
 * THE SOFTWARE.
 */";

/// Fill the `{year}` and `{author}` placeholders of a header template.
pub fn render_header(template: &str, year: i32, author: &str) -> String {
    template
        .replace("{year}", &year.to_string())
        .replace("{author}", author)
}

/// Runtime includes for external modules
pub const RUNTIME_INCLUDES: &str = r#"// Include required definitions first.
#include "py/obj.h"
#include "py/objstr.h"
#include "py/objtuple.h"
#include "py/runtime.h"
#include "py/builtin.h"

#include "objfloat.h"

    /*
    // Example exception for any generated function
    if (some_val == 0) {
        mp_raise_ValueError("'some_val' can't be zero!");
    }
    */"#;

/// Largest argument count accepted by `mp_arg_check_num`
pub const UNBOUNDED_ARGS: &str = "MP_OBJ_FUN_ARGS_MAX";

/// Annotation with any subscript removed: `list[int]` -> `list`
fn annotation_base(annotation: &str) -> &str {
    let annotation = annotation.trim();
    annotation
        .split_once('[')
        .map_or(annotation, |(base, _)| base.trim())
}

/// True when the annotation maps to a native C value
pub fn converts(annotation: Option<&str>) -> bool {
    matches!(
        annotation.map(annotation_base),
        Some("int" | "float" | "bool" | "str" | "tuple" | "list" | "bytes" | "bytearray")
    )
}

/// Lines that bind `name` from the object expression `source`
pub fn unpack_lines(name: &str, annotation: Option<&str>, source: &str) -> Vec<String> {
    match annotation.map(annotation_base) {
        Some("int") => vec![format!("mp_int_t {name} = mp_obj_get_int({source});")],
        Some("float") => vec![format!("mp_float_t {name} = mp_obj_get_float({source});")],
        Some("bool") => vec![format!("bool {name} = mp_obj_is_true({source});")],
        Some("str") => vec![format!(
            "const char *{name} = mp_obj_str_get_str({source});"
        )],
        Some("tuple" | "list") => vec![
            format!("size_t {name}_len = 0;"),
            format!("mp_obj_t *{name} = NULL;"),
            format!("mp_obj_get_array({source}, &{name}_len, &{name});"),
        ],
        Some("bytes" | "bytearray") => vec![
            format!("mp_buffer_info_t {name};"),
            format!("mp_get_buffer_raise({source}, &{name}, MP_BUFFER_READ);"),
        ],
        _ => vec![format!("mp_obj_t {name} = {source};")],
    }
}

/// Placeholder return value matching the return annotation
pub fn return_placeholder(returns: Option<&str>) -> &'static str {
    match returns.map(annotation_base) {
        Some("int") => "mp_obj_new_int(0)",
        Some("float") => "mp_obj_new_float(0.0)",
        Some("bool") => "mp_const_false",
        Some("str") => "mp_obj_new_str(\"\", 0)",
        Some("bytes") => "mp_const_empty_bytes",
        Some("tuple") => "mp_const_empty_tuple",
        Some("list") => "mp_obj_new_list(0, NULL)",
        Some("dict") => "mp_obj_new_dict(0)",
        _ => "mp_const_none",
    }
}

/// C type of a module-level variable holding a value of `kind`
pub fn variable_c_type(kind: &str) -> &'static str {
    match kind {
        "int" => "mp_int_t",
        "float" => "mp_float_t",
        "bool" => "bool",
        "str" => "const char *",
        _ => "mp_obj_t",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_header() {
        let header = render_header("(c) {year} {author}", 2024, "Jane Doe");
        assert_eq!(header, "(c) 2024 Jane Doe");
        assert!(DEFAULT_HEADER_TEMPLATE.contains("{year}"));
    }

    #[test]
    fn test_unpack_by_annotation() {
        assert_eq!(
            unpack_lines("a", Some("int"), "a_in"),
            vec!["mp_int_t a = mp_obj_get_int(a_in);"]
        );
        assert_eq!(
            unpack_lines("b", None, "args[1]"),
            vec!["mp_obj_t b = args[1];"]
        );
        assert_eq!(unpack_lines("c", Some("list[int]"), "args[2]").len(), 3);
    }

    #[test]
    fn test_converts() {
        assert!(converts(Some("str")));
        assert!(converts(Some("tuple[int, int]")));
        assert!(!converts(Some("None")));
        assert!(!converts(None));
    }

    #[test]
    fn test_return_placeholder() {
        assert_eq!(return_placeholder(Some("int")), "mp_obj_new_int(0)");
        assert_eq!(return_placeholder(Some("None")), "mp_const_none");
        assert_eq!(return_placeholder(None), "mp_const_none");
    }
}
