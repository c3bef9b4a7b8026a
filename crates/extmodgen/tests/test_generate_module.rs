use std::fs;

use extmodgen::{
    code_generator::generate,
    config::Config,
    error::GenerateError,
    frontend::read_module,
    writer::{WriteOutcome, write_artifacts},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const EXAMPLE: &str = r#"
"""
This is a module help.  Put it into genarated C code.
"""
__author__ = 'Module Author'

CONST_INT = 2
CONST_TUPLE = (None, 1, 2.2, True, 'Hello, world!')
counter = 0


def func_a():
    pass

def func_c(arg1: int, arg2) -> int:
    pass

def func_g(arg1, arg2, arg3=None, arg4=None):
    pass


class Class(object):
    """
    Class constants are supported
    """
    CONST1 = 1

    def __init__(self, arg1: int):
        pass

    def func_a(self):
        pass
"#;

fn write_example(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("example.py");
    fs::write(&path, EXAMPLE).unwrap();
    path
}

#[test]
fn test_end_to_end_external_module() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_example(&temp_dir);

    let module = read_module(&path).unwrap();
    let options = Config::default().generator_options(&module.author, 2024).unwrap();
    let generated = generate(&module, &options).unwrap();
    let outcome = write_artifacts(&generated, temp_dir.path(), false).unwrap();

    let source_path = temp_dir.path().join("example.c");
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            source: source_path.clone(),
            symbols: temp_dir.path().join("qstrdefs.h"),
        }
    );

    let source = fs::read_to_string(&source_path).unwrap();
    assert!(source.starts_with("/*\n * This file is part of the MicroPython project"));
    assert!(source.contains("Copyright (c) 2024 Module Author"));
    for expected in [
        "#define MODULE_EXAMPLE_ENABLED (1) // you may copy this line to the mpconfigport.h",
        "STATIC const mp_int_t CONST_INT = 2;",
        "STATIC const MP_DEFINE_STR_OBJ(CONST_TUPLE_0_4_str_obj, \"Hello, world!\");",
        "static mp_int_t counter\t= 0;",
        "STATIC MP_DEFINE_CONST_FUN_OBJ_0(example_func_a_obj, example_func_a);",
        "STATIC mp_obj_t example_func_c(mp_obj_t arg1_in, mp_obj_t arg2) {",
        "STATIC MP_DEFINE_CONST_FUN_OBJ_VAR_BETWEEN(example_func_g_obj, 2, 4, example_func_g);",
        "STATIC const mp_int_t Class_CONST1 = 1;",
        "    mp_arg_check_num(n_args, n_kw, 1, 1, false);",
        "STATIC MP_DEFINE_CONST_FUN_OBJ_1(example_Class_func_a_obj, example_Class_func_a);",
        "    .make_new = example_Class_make_new,",
        "MP_REGISTER_MODULE(MP_QSTR_example, example_cmodule, MODULE_EXAMPLE_ENABLED);",
    ] {
        assert!(source.contains(expected), "missing line: {expected}");
    }
    assert!(source.ends_with("#endif // MODULE_EXAMPLE_ENABLED\n"));

    let symbols = fs::read_to_string(temp_dir.path().join("qstrdefs.h")).unwrap();
    assert_eq!(
        symbols,
        "#if MODULE_EXAMPLE_ENABLED\n\
         Q(CONST1)\n\
         Q(CONST_INT)\n\
         Q(CONST_TUPLE)\n\
         Q(Class)\n\
         Q(example)\n\
         Q(func_a)\n\
         Q(func_c)\n\
         Q(func_g)\n\
         #endif\n"
    );
}

#[test]
fn test_core_port_module_from_project_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_example(&temp_dir);
    fs::write(
        temp_dir.path().join("extmodgen.toml"),
        "external_module = false\nauthor = \"Ignored\"\n",
    )
    .unwrap();

    let config = Config::load_layers(&[temp_dir.path().join("extmodgen.toml")], |_| None).unwrap();
    let module = read_module(&path).unwrap();
    let options = config.generator_options(&module.author, 2024).unwrap();
    let generated = generate(&module, &options).unwrap();
    write_artifacts(&generated, temp_dir.path(), false).unwrap();

    let source = fs::read_to_string(temp_dir.path().join("modexample.c")).unwrap();
    assert!(source.contains("Copyright (c) 2024 Module Author"));
    assert!(source.contains("#if MICROPY_PY_EXAMPLE\n"));
    assert!(!source.contains("#include"));
    assert!(!source.contains("MP_REGISTER_MODULE"));
    assert!(source.ends_with("#endif // MICROPY_PY_EXAMPLE\n"));
    let symbols = fs::read_to_string(temp_dir.path().join("qstrdefs.h")).unwrap();
    assert!(symbols.starts_with("#if MICROPY_PY_EXAMPLE\n"));
}

#[test]
fn test_second_run_leaves_existing_output_alone() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_example(&temp_dir);
    let module = read_module(&path).unwrap();
    let options = Config::default().generator_options(&module.author, 2024).unwrap();
    let generated = generate(&module, &options).unwrap();

    let source_path = temp_dir.path().join("example.c");
    fs::write(&source_path, "/* hand edited */\n").unwrap();

    let outcome = write_artifacts(&generated, temp_dir.path(), false).unwrap();
    assert_eq!(outcome, WriteOutcome::Preexisting(source_path.clone()));
    assert_eq!(fs::read_to_string(&source_path).unwrap(), "/* hand edited */\n");
    assert!(!temp_dir.path().join("qstrdefs.h").exists());
}

#[test]
fn test_unsupported_signature_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.py");
    fs::write(&path, "def ok():\n    pass\n\ndef both(*args, **kwargs):\n    pass\n").unwrap();

    let module = read_module(&path).unwrap();
    let error = generate(&module, &Config::default().generator_options("", 2024).unwrap())
        .unwrap_err();
    assert!(matches!(
        error,
        GenerateError::UnsupportedSignature { ref function, .. } if function == "both"
    ));
    assert!(!temp_dir.path().join("broken.c").exists());
    assert!(!temp_dir.path().join("qstrdefs.h").exists());
}

#[test]
fn test_missing_module_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let error = read_module(&temp_dir.path().join("absent.py")).unwrap_err();
    assert!(error.to_string().contains("absent.py"));
}
