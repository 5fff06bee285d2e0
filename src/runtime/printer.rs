//! Textual rendering of expressions
//!
//! Readable output (`pr-str`, `prn`, `Display`) can be read back by the reader:
//! strings are quoted and escaped, characters keep their backslash syntax and
//! big integers keep their `n` suffix. Display output (`str`, `println`) shows
//! strings and characters raw.

use std::fmt::{self, Write};

use super::expr::{Expr, FunctionKind};

/// Renders `expr`, quoting strings and characters when `readably` is set
pub fn pr_str(expr: &Expr, readably: bool) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_expr(&mut out, expr, readably);
    out
}

fn write_expr(out: &mut String, expr: &Expr, readably: bool) -> fmt::Result {
    match expr {
        Expr::Nil => out.write_str("nil"),
        Expr::True => out.write_str("true"),
        Expr::False => out.write_str("false"),
        Expr::Int(n) => write!(out, "{}", n),
        Expr::BigInt(n) if readably => write!(out, "{}n", n),
        Expr::BigInt(n) => write!(out, "{}", n),
        Expr::Float(x) => write_float(out, *x),
        Expr::Char(c) if readably => write_char_literal(out, *c),
        Expr::Char(c) => out.write_char(*c),
        Expr::String(s) if readably => write_string_literal(out, s),
        Expr::String(s) => out.write_str(s),
        Expr::Symbol(sym) => out.write_str(sym.name()),
        Expr::Keyword(kw) => write!(out, ":{}", kw.name()),
        Expr::Seq(items) => write_items(out, "(", items, ")", readably),
        Expr::Vector(items) => write_items(out, "[", items, "]", readably),
        Expr::Map(map) => {
            out.write_char('{')?;
            for (i, (key, value)) in map.entries().iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                write_expr(out, key, readably)?;
                out.write_char(' ')?;
                write_expr(out, value, readably)?;
            }
            out.write_char('}')
        }
        Expr::Function(function) => {
            let label = if function.is_macro() { "macro" } else { "fn" };
            match function.kind() {
                FunctionKind::Native(tool) => write!(out, "#<native {}>", tool.name()),
                FunctionKind::Interpreted(lambda) => {
                    write!(out, "#<{}", label)?;
                    if let Some(name) = &lambda.name {
                        write!(out, " {}", name.name())?;
                    }
                    out.write_char(' ')?;
                    write_expr(out, &lambda.params.to_expr(), readably)?;
                    out.write_char('>')
                }
            }
        }
    }
}

fn write_items(
    out: &mut String,
    open: &str,
    items: &[Expr],
    close: &str,
    readably: bool,
) -> fmt::Result {
    out.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write_expr(out, item, readably)?;
    }
    out.write_str(close)
}

fn write_float(out: &mut String, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(out, "{:.1}", x)
    } else {
        write!(out, "{:?}", x)
    }
}

fn write_char_literal(out: &mut String, c: char) -> fmt::Result {
    out.write_char('\\')?;
    match c {
        '\n' => out.write_str("newline"),
        ' ' => out.write_str("space"),
        '\t' => out.write_str("tab"),
        '\u{8}' => out.write_str("backspace"),
        '\u{c}' => out.write_str("formfeed"),
        '\r' => out.write_str("return"),
        c if c.is_control() => write!(out, "u{:04X}", c as u32),
        c => out.write_char(c),
    }
}

fn write_string_literal(out: &mut String, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&pr_str(self, true))
    }
}
