//! Rendering values for failure messages

use std::collections::BTreeSet;

use crate::model::{get_members, MemberFilter, Value};

/// Renders a value as display text for a failure message
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &Value) -> String;
}

/// Depth-limited, cycle-safe formatter
///
/// - `<null>` for null
/// - strings quoted, chars single-quoted
/// - enums as `Type.Variant`
/// - sequences as `{a, b}`, maps as `{[k] = v}`
/// - objects as `Type { Member = value }`
#[derive(Debug, Clone, Copy)]
pub struct DefaultValueFormatter {
    pub max_depth: usize,
    pub max_items: usize,
}

impl Default for DefaultValueFormatter {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_items: 32,
        }
    }
}

impl ValueFormatter for DefaultValueFormatter {
    fn format(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut visiting = BTreeSet::new();
        self.write(value, 0, &mut visiting, &mut out);
        out
    }
}

impl DefaultValueFormatter {
    fn write(&self, value: &Value, depth: usize, visiting: &mut BTreeSet<usize>, out: &mut String) {
        if let Some(id) = value.identity() {
            if !visiting.insert(id) {
                out.push_str("<cyclic ");
                out.push_str(&type_name(value));
                out.push('>');
                return;
            }
            if depth >= self.max_depth {
                out.push_str(&type_name(value));
                out.push_str(" {...}");
                visiting.remove(&id);
                return;
            }
        }

        match value {
            Value::Null => out.push_str("<null>"),
            Value::Bool(v) => out.push_str(&v.to_string()),
            Value::Char(v) => out.push_str(&format!("'{v}'")),
            Value::I32(v) => out.push_str(&v.to_string()),
            Value::I64(v) => out.push_str(&v.to_string()),
            Value::U64(v) => out.push_str(&v.to_string()),
            Value::F32(v) => out.push_str(&format!("{v:?}")),
            Value::F64(v) => out.push_str(&format!("{v:?}")),
            Value::Str(v) => out.push_str(&format!("{v:?}")),
            Value::Enum(e) => match e.name() {
                Some(name) => out.push_str(&format!("{}.{}", e.ty.name(), name)),
                None => out.push_str(&format!("{}({})", e.ty.name(), e.value)),
            },
            Value::Type(t) => out.push_str(t.name()),
            Value::Sequence(s) => self.write_items(&s.items(), depth, visiting, out),
            Value::Array(a) if a.rank() == 1 => self.write_items(a.items(), depth, visiting, out),
            Value::Array(a) => self.write_grid(a.items(), a.lengths(), depth, visiting, out),
            Value::Map(m) => {
                let entries = m.entries();
                if entries.is_empty() {
                    out.push_str("{empty}");
                } else {
                    out.push('{');
                    for (i, (k, v)) in entries.iter().take(self.max_items).enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push('[');
                        self.write(k, depth + 1, visiting, out);
                        out.push_str("] = ");
                        self.write(v, depth + 1, visiting, out);
                    }
                    if entries.len() > self.max_items {
                        out.push_str(", …");
                    }
                    out.push('}');
                }
            }
            Value::Object(o) => {
                out.push_str(o.type_ref().name());
                let members = get_members(o.type_ref(), MemberFilter::ALL);
                if members.is_empty() {
                    out.push_str(" { }");
                } else {
                    out.push_str(" { ");
                    for (i, member) in members.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(member.name());
                        out.push_str(" = ");
                        match member.read(value, &[]) {
                            Ok(v) => self.write(&v, depth + 1, visiting, out),
                            Err(_) => out.push_str("<unreadable>"),
                        }
                    }
                    out.push_str(" }");
                }
            }
        }

        if let Some(id) = value.identity() {
            visiting.remove(&id);
        }
    }

    fn write_items(&self, items: &[Value], depth: usize, visiting: &mut BTreeSet<usize>, out: &mut String) {
        if items.is_empty() {
            out.push_str("{empty}");
            return;
        }
        out.push('{');
        for (i, item) in items.iter().take(self.max_items).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write(item, depth + 1, visiting, out);
        }
        if items.len() > self.max_items {
            out.push_str(", …");
        }
        out.push('}');
    }

    fn write_grid(
        &self,
        items: &[Value],
        lengths: &[usize],
        depth: usize,
        visiting: &mut BTreeSet<usize>,
        out: &mut String,
    ) {
        let Some((first, rest)) = lengths.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.write_items(items, depth, visiting, out);
            return;
        }
        let stride: usize = rest.iter().product();
        out.push('{');
        for row in 0..*first {
            if row > 0 {
                out.push_str(", ");
            }
            let start = row * stride;
            let end = (start + stride).min(items.len());
            self.write_grid(&items[start.min(end)..end], rest, depth, visiting, out);
        }
        out.push('}');
    }
}

fn type_name(value: &Value) -> String {
    value
        .runtime_type()
        .map(|t| t.name().to_string())
        .unwrap_or_else(|| "<null>".to_string())
}
