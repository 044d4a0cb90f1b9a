//! Filesystem access. I/O failures surface as script errors.

use std::fs;
use std::io::Write;

use rill_value::errors::io_failure;
use rill_value::{CallSignature, DefaultValue, EvalResult, TypeMask, Value};

use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let string1 = TypeMask::STRING.singleton();
    let logical1 = TypeMask::LOGICAL.singleton();

    table.builtin(
        CallSignature::function("filesAtPath", TypeMask::STRING)
            .arg("path", string1)
            .optional("fullPaths", logical1, DefaultValue::Logical(false)),
        files_at_path,
    );
    table.builtin(
        CallSignature::function("readFile", TypeMask::STRING).arg("filePath", string1),
        read_file,
    );
    table.builtin(
        CallSignature::function("writeFile", logical1)
            .arg("filePath", string1)
            .arg("contents", TypeMask::STRING)
            .optional("append", logical1, DefaultValue::Logical(false)),
        write_file,
    );
}

/// Sorted entry names in a directory, optionally prefixed with the path.
fn files_at_path(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let path = args[0].string_at(0)?;
    let full_paths = args[1].logical_at(0)?;

    let entries = fs::read_dir(&path).map_err(|e| io_failure("reading directory", &path, &e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_failure("reading directory", &path, &e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    if full_paths {
        let prefix = if path.ends_with('/') {
            path
        } else {
            format!("{path}/")
        };
        for name in &mut names {
            name.insert_str(0, &prefix);
        }
    }
    Ok(Value::string_vec(names))
}

/// The file's lines, without terminators.
fn read_file(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let path = args[0].string_at(0)?;
    let text = fs::read_to_string(&path).map_err(|e| io_failure("reading", &path, &e))?;
    Ok(Value::string_vec(text.lines().map(String::from).collect()))
}

/// Write each element of `contents` as one line.
fn write_file(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let path = args[0].string_at(0)?;
    let append = args[2].logical_at(0)?;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(&path)
        .map_err(|e| io_failure("writing", &path, &e))?;

    let mut text = String::new();
    for line in args[1].as_strings().unwrap_or_default() {
        text.push_str(line);
        text.push('\n');
    }
    file.write_all(text.as_bytes())
        .map_err(|e| io_failure("writing", &path, &e))?;
    tracing::debug!(path = %path, lines = args[1].count(), append, "wrote file");
    Ok(Value::logical(true))
}
