//! Deterministic textual rendering of [`Value`]s.
//!
//! Used by diagnostics (`got`/`expected` lines, summaries, map keys in paths).
//! Rendering terminates on cyclic graphs: a pointer met again while its own
//! pointee is being rendered prints as `<cycle>`.

use std::fmt::{self, Write as _};

use crate::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::default().value(f, self)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Pointer identities currently being rendered.
#[derive(Default)]
struct Renderer {
    stack: Vec<usize>,
}

impl Renderer {
    fn value(&mut self, f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
        match v {
            Value::Invalid | Value::Dyn(None) => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i, _) => write!(f, "{i}"),
            Value::Uint(u, _) => write!(f, "{u}"),
            Value::Float(x, _) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Dyn(Some(inner)) => self.value(f, inner),
            Value::Array { items, .. }
            | Value::Slice {
                items: Some(items), ..
            } => self.seq(f, items),
            Value::Map {
                entries: Some(entries),
                ..
            } => {
                f.write_char('{')?;
                for (i, (k, val)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.value(f, k)?;
                    f.write_str(": ")?;
                    self.value(f, val)?;
                }
                f.write_char('}')
            }
            Value::Ptr { .. } => match (v.identity(), v.pointee()) {
                (Some(id), Some(pointee)) => {
                    if self.stack.contains(&id) {
                        return f.write_str("<cycle>");
                    }
                    self.stack.push(id);
                    f.write_char('&')?;
                    let res = self.value(f, pointee);
                    self.stack.pop();
                    res
                }
                _ => typed_nil(f, v),
            },
            Value::Struct(record) => {
                f.write_str(record.name())?;
                if record.fields().is_empty() {
                    return f.write_str(" {}");
                }
                f.write_str(" { ")?;
                for (i, field) in record.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", field.name)?;
                    self.value(f, &field.value)?;
                }
                f.write_str(" }")
            }
            Value::Func {
                signature,
                handle: Some(_),
            } => write!(f, "<fn {signature}>"),
            Value::Chan {
                elem,
                handle: Some(_),
            } => write!(f, "<Chan<{elem}>>"),
            Value::Custom(c) => write!(f, "{c:?}"),
            Value::Op(op) => f.write_str(&op.render()),
            Value::Slice { items: None, .. }
            | Value::Map { entries: None, .. }
            | Value::Func { handle: None, .. }
            | Value::Chan { handle: None, .. } => typed_nil(f, v),
        }
    }

    fn seq(&mut self, f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        f.write_char('[')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.value(f, item)?;
        }
        f.write_char(']')
    }
}

fn typed_nil(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v.type_of() {
        Some(ty) => write!(f, "({ty})(nil)"),
        None => f.write_str("nil"),
    }
}
