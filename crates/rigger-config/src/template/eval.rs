//! Evaluates template pipelines against a JSON value.

use serde_json::Value;

use super::parser::{Command, Expr, Pipeline};
use super::{TemplateError, TemplateResult};

pub(crate) fn eval_pipeline(pipeline: &Pipeline, dot: &Value) -> TemplateResult<Value> {
    let mut piped = None;
    for command in &pipeline.commands {
        piped = Some(eval_command(command, dot, piped)?);
    }
    Ok(piped.unwrap_or(Value::Null))
}

fn eval_command(command: &Command, dot: &Value, piped: Option<Value>) -> TemplateResult<Value> {
    let (head, rest) = command
        .args
        .split_first()
        .ok_or(TemplateError::EmptyCommand(0))?;

    if let Expr::Func(name) = head {
        let mut args = rest
            .iter()
            .map(|arg| eval_operand(arg, dot))
            .collect::<TemplateResult<Vec<_>>>()?;
        args.extend(piped);
        return call(name, args);
    }

    if !rest.is_empty() || piped.is_some() {
        return Err(TemplateError::NotAFunction(format!("{head:?}")));
    }
    eval_operand(head, dot)
}

fn eval_operand(expr: &Expr, dot: &Value) -> TemplateResult<Value> {
    match expr {
        Expr::Dot => Ok(dot.clone()),
        Expr::Field(path) => walk(dot, path),
        Expr::Chain(base, path) => walk(&eval_operand(base, dot)?, path),
        Expr::Paren(pipeline) => eval_pipeline(pipeline, dot),
        Expr::Func(name) => call(name, Vec::new()),
        Expr::Int(n) => Ok(Value::from(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Nil => Ok(Value::Null),
    }
}

fn walk(value: &Value, path: &[String]) -> TemplateResult<Value> {
    let mut current = value;
    for name in path {
        current = field(current, name)?;
    }
    Ok(current.clone())
}

/// Look up `name`, accepting either the template spelling (`PythonInterpreter`)
/// or the document's camelCase key (`pythonInterpreter`).
fn field<'v>(value: &'v Value, name: &str) -> TemplateResult<&'v Value> {
    match value {
        Value::Object(map) => map
            .get(name)
            .or_else(|| map.get(&lower_first(name)))
            .ok_or_else(|| TemplateError::MissingField(name.to_string())),
        other => Err(TemplateError::NotARecord {
            field: name.to_string(),
            kind: kind(other),
        }),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "record",
    }
}

fn call(name: &str, args: Vec<Value>) -> TemplateResult<Value> {
    match name {
        "index" => index(args),
        "len" => len(args),
        "print" => Ok(Value::String(sprint(&args))),
        "printf" => printf(args),
        other => Err(TemplateError::UnknownFunction(other.to_string())),
    }
}

fn index(args: Vec<Value>) -> TemplateResult<Value> {
    let mut args = args.into_iter();
    let mut item = args.next().ok_or_else(|| TemplateError::WrongArgs {
        name: "index",
        message: "want at least 1 got 0".to_string(),
    })?;

    for key in args {
        item = match (item, &key) {
            (Value::Array(mut items), Value::Number(n)) => {
                let i = n.as_i64().unwrap_or(-1);
                if i < 0 || i as usize >= items.len() {
                    return Err(TemplateError::OutOfRange(i));
                }
                items.swap_remove(i as usize)
            }
            (Value::Object(mut map), Value::String(k)) => map.remove(k).unwrap_or(Value::Null),
            (target, key) => {
                return Err(TemplateError::BadIndex {
                    target: kind(&target),
                    index: render(key),
                });
            }
        };
    }
    Ok(item)
}

fn len(args: Vec<Value>) -> TemplateResult<Value> {
    let [value] = <[Value; 1]>::try_from(args).map_err(|args| TemplateError::WrongArgs {
        name: "len",
        message: format!("want 1 got {}", args.len()),
    })?;
    let n = match &value {
        Value::String(s) => s.len(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(TemplateError::WrongArgs {
                name: "len",
                message: format!("len of {}", kind(other)),
            });
        }
    };
    Ok(Value::from(n))
}

/// Concatenate operands, adding a space between two operands when neither is a string.
fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_string() && !arg.is_string() {
            out.push(' ');
        }
        out.push_str(&render(arg));
    }
    out
}

fn printf(args: Vec<Value>) -> TemplateResult<Value> {
    let mut args = args.into_iter();
    let format = match args.next() {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(TemplateError::WrongArgs {
                name: "printf",
                message: format!("format must be a string, got {}", kind(&other)),
            });
        }
        None => {
            return Err(TemplateError::WrongArgs {
                name: "printf",
                message: "want at least 1 got 0".to_string(),
            });
        }
    };

    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'd' | 'v')) => match args.next() {
                Some(arg) => out.push_str(&render(&arg)),
                None => out.push_str(&format!("%!{verb}(MISSING)")),
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    Ok(Value::String(out))
}

/// Text form of a value as written into template output.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Object(_) => value.to_string(),
    }
}
