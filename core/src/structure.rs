//! Structured values — Push-style rendering of nested records
//!
//! Producers never hand over a built tree. They implement [`Structure`] and
//! drive a [`StructSink`] with open/close and scalar calls, so arbitrarily
//! large payloads can be streamed.
//!
//! [`TextStructSink`] is the stock sink: it renders into a `String` of the
//! form `key: value, key2: [1, 2]`, tracking separator placement with one
//! [`NestingStack`] bit per open container.

use crate::NestingStack;
use std::fmt::Write;

/// Receiver of a structured value.
///
/// Map-context calls (`*_property`, `end_map`) are only valid after a
/// `begin_map`/`map_property`; list-context calls (positional scalars,
/// `begin_map`/`begin_list` as elements, `end_list`) only inside a list.
/// A top-level value starts with `begin_map` or `begin_list`.
pub trait StructSink {
    /// Open a map: top-level, or as an element of the enclosing list.
    fn begin_map(&mut self);
    /// Open a list: top-level, or as an element of the enclosing list.
    fn begin_list(&mut self);

    /// Named boolean inside a map.
    fn bool_property(&mut self, name: &str, value: bool);
    /// Named string inside a map.
    fn string_property(&mut self, name: &str, value: &str);
    /// Named integer inside a map.
    fn int_property(&mut self, name: &str, value: i64);
    /// Named float inside a map.
    fn float_property(&mut self, name: &str, value: f64);
    /// Open a named map inside a map.
    fn map_property(&mut self, name: &str);
    /// Open a named list inside a map.
    fn list_property(&mut self, name: &str);
    /// Close the innermost map.
    fn end_map(&mut self);

    /// Boolean element inside a list.
    fn bool(&mut self, value: bool);
    /// String element inside a list.
    fn string(&mut self, value: &str);
    /// Integer element inside a list.
    fn int(&mut self, value: i64);
    /// Float element inside a list.
    fn float(&mut self, value: f64);
    /// Close the innermost list.
    fn end_list(&mut self);
}

/// A value that can push itself into a [`StructSink`].
pub trait Structure {
    /// Emit this value into `sink`.
    fn put_struct(&self, sink: &mut dyn StructSink);
}

impl<T: Structure + ?Sized> Structure for &T {
    fn put_struct(&self, sink: &mut dyn StructSink) {
        (**self).put_struct(sink);
    }
}

impl<T: Structure + ?Sized> Structure for Box<T> {
    fn put_struct(&self, sink: &mut dyn StructSink) {
        (**self).put_struct(sink);
    }
}

impl<T: Structure + ?Sized> Structure for std::sync::Arc<T> {
    fn put_struct(&self, sink: &mut dyn StructSink) {
        (**self).put_struct(sink);
    }
}

/// Renders a structured value as text.
///
/// # Bracket rule
///
/// The outermost container omits its brackets unless
/// `keep_outermost_brackets` is set: `{a: 1}` renders as `a: 1`.
///
/// # Scalars
///
/// - booleans: `true` / `false`
/// - strings: double-quoted with Rust escaping
/// - integers: decimal
/// - floats: shortest round-tripping digits, exponent form below `1e-4`
///   or from `1e21` up
#[derive(Debug, Default)]
pub struct TextStructSink {
    out: String,
    stack: NestingStack,
    keep_outermost_brackets: bool,
}

impl TextStructSink {
    /// Create a sink that elides the outermost brackets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink with explicit outermost-bracket behavior.
    #[must_use]
    pub fn with_outermost_brackets(keep: bool) -> Self {
        Self {
            keep_outermost_brackets: keep,
            ..Self::default()
        }
    }

    /// Text rendered so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the sink and return the rendered text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Bookkeeping before any element or property.
    ///
    /// Returns `true` when there is no enclosing container (outermost value).
    fn enter_element(&mut self) -> bool {
        match self.stack.top() {
            None => true,
            Some(true) => {
                self.out.push_str(", ");
                false
            }
            Some(false) => {
                self.stack.replace(true);
                false
            }
        }
    }

    fn open(&mut self, bracket: char) {
        let outermost = self.enter_element();
        if !outermost || self.keep_outermost_brackets {
            self.out.push(bracket);
        }
        self.stack.push(false);
    }

    fn open_named(&mut self, name: &str, bracket: char) {
        self.enter_element();
        self.out.push_str(name);
        self.out.push_str(": ");
        self.out.push(bracket);
        self.stack.push(false);
    }

    fn close(&mut self, bracket: char) {
        if self.stack.pop().is_none() {
            return;
        }
        if self.keep_outermost_brackets || !self.stack.is_empty() {
            self.out.push(bracket);
        }
    }

    fn name(&mut self, name: &str) {
        self.enter_element();
        self.out.push_str(name);
        self.out.push_str(": ");
    }

    fn write_string(&mut self, value: &str) {
        let _ = write!(self.out, "{value:?}");
    }

    /// Positional notation inside `[1e-4, 1e21)`, exponent notation outside.
    fn write_float(&mut self, value: f64) {
        let magnitude = value.abs();
        if magnitude.is_finite() && magnitude != 0.0 && !(1e-4..1e21).contains(&magnitude) {
            let _ = write!(self.out, "{value:e}");
        } else {
            let _ = write!(self.out, "{value}");
        }
    }
}

impl StructSink for TextStructSink {
    fn begin_map(&mut self) {
        self.open('{');
    }

    fn begin_list(&mut self) {
        self.open('[');
    }

    fn bool_property(&mut self, name: &str, value: bool) {
        self.name(name);
        self.out.push_str(if value { "true" } else { "false" });
    }

    fn string_property(&mut self, name: &str, value: &str) {
        self.name(name);
        self.write_string(value);
    }

    fn int_property(&mut self, name: &str, value: i64) {
        self.name(name);
        let _ = write!(self.out, "{value}");
    }

    fn float_property(&mut self, name: &str, value: f64) {
        self.name(name);
        self.write_float(value);
    }

    fn map_property(&mut self, name: &str) {
        self.open_named(name, '{');
    }

    fn list_property(&mut self, name: &str) {
        self.open_named(name, '[');
    }

    fn end_map(&mut self) {
        self.close('}');
    }

    fn bool(&mut self, value: bool) {
        self.enter_element();
        self.out.push_str(if value { "true" } else { "false" });
    }

    fn string(&mut self, value: &str) {
        self.enter_element();
        self.write_string(value);
    }

    fn int(&mut self, value: i64) {
        self.enter_element();
        let _ = write!(self.out, "{value}");
    }

    fn float(&mut self, value: f64) {
        self.enter_element();
        self.write_float(value);
    }

    fn end_list(&mut self) {
        self.close(']');
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON producer (feature = "config")
// ═══════════════════════════════════════════════════════════════════════════════

/// Objects become maps, arrays become lists. `null` properties are omitted
/// and `null` elements skipped; a bare scalar is wrapped in a one-element list.
#[cfg(feature = "config")]
impl Structure for serde_json::Value {
    fn put_struct(&self, sink: &mut dyn StructSink) {
        use serde_json::Value;

        fn put_element(value: &Value, sink: &mut dyn StructSink) {
            match value {
                Value::Null => {}
                Value::Bool(b) => sink.bool(*b),
                Value::String(s) => sink.string(s),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => sink.int(i),
                    None => sink.float(n.as_f64().unwrap_or(f64::NAN)),
                },
                Value::Array(items) => {
                    sink.begin_list();
                    items.iter().for_each(|item| put_element(item, sink));
                    sink.end_list();
                }
                Value::Object(fields) => {
                    sink.begin_map();
                    put_fields(fields, sink);
                    sink.end_map();
                }
            }
        }

        fn put_fields(fields: &serde_json::Map<String, Value>, sink: &mut dyn StructSink) {
            for (name, value) in fields {
                match value {
                    Value::Null => {}
                    Value::Bool(b) => sink.bool_property(name, *b),
                    Value::String(s) => sink.string_property(name, s),
                    Value::Number(n) => match n.as_i64() {
                        Some(i) => sink.int_property(name, i),
                        None => sink.float_property(name, n.as_f64().unwrap_or(f64::NAN)),
                    },
                    Value::Array(items) => {
                        sink.list_property(name);
                        items.iter().for_each(|item| put_element(item, sink));
                        sink.end_list();
                    }
                    Value::Object(inner) => {
                        sink.map_property(name);
                        put_fields(inner, sink);
                        sink.end_map();
                    }
                }
            }
        }

        match self {
            Value::Array(_) | Value::Object(_) => put_element(self, sink),
            Value::Null => {}
            scalar => {
                sink.begin_list();
                put_element(scalar, sink);
                sink.end_list();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{a: 1, b: [true, "x"]}`
    struct Sample;

    impl Structure for Sample {
        fn put_struct(&self, sink: &mut dyn StructSink) {
            sink.begin_map();
            sink.int_property("a", 1);
            sink.list_property("b");
            sink.bool(true);
            sink.string("x");
            sink.end_list();
            sink.end_map();
        }
    }

    fn render(value: &dyn Structure, keep: bool) -> String {
        let mut sink = TextStructSink::with_outermost_brackets(keep);
        value.put_struct(&mut sink);
        sink.finish()
    }

    #[test]
    fn outermost_brackets_elided_by_default() {
        assert_eq!(render(&Sample, false), r#"a: 1, b: [true, "x"]"#);
    }

    #[test]
    fn outermost_brackets_forced() {
        assert_eq!(render(&Sample, true), r#"{a: 1, b: [true, "x"]}"#);
    }

    #[test]
    fn nested_containers_in_lists() {
        struct Nested;
        impl Structure for Nested {
            fn put_struct(&self, sink: &mut dyn StructSink) {
                sink.begin_list();
                sink.begin_map();
                sink.bool_property("ok", false);
                sink.end_map();
                sink.begin_list();
                sink.end_list();
                sink.int(-3);
                sink.end_list();
            }
        }
        assert_eq!(render(&Nested, false), "{ok: false}, [], -3");
        assert_eq!(render(&Nested, true), "[{ok: false}, [], -3]");
    }

    #[test]
    fn empty_containers() {
        struct EmptyMap;
        impl Structure for EmptyMap {
            fn put_struct(&self, sink: &mut dyn StructSink) {
                sink.begin_map();
                sink.map_property("inner");
                sink.end_map();
                sink.end_map();
            }
        }
        assert_eq!(render(&EmptyMap, false), "inner: {}");
        assert_eq!(render(&EmptyMap, true), "{inner: {}}");
    }

    #[test]
    fn strings_are_escaped() {
        struct Quoted;
        impl Structure for Quoted {
            fn put_struct(&self, sink: &mut dyn StructSink) {
                sink.begin_map();
                sink.string_property("s", "say \"hi\"\n");
                sink.end_map();
            }
        }
        assert_eq!(render(&Quoted, false), r#"s: "say \"hi\"\n""#);
    }

    #[test]
    fn floats_use_shortest_form() {
        struct Floats;
        impl Structure for Floats {
            fn put_struct(&self, sink: &mut dyn StructSink) {
                sink.begin_list();
                sink.float(0.1);
                sink.float(2.5);
                sink.float(1e20);
                sink.float(1e21);
                sink.float(-1.5e300);
                sink.float(0.0001);
                sink.float(1e-10);
                sink.float(0.0);
                sink.end_list();
            }
        }
        assert_eq!(
            render(&Floats, false),
            "0.1, 2.5, 100000000000000000000, 1e21, -1.5e300, 0.0001, 1e-10, 0"
        );
    }

    #[test]
    fn depth_returns_to_zero() {
        let mut sink = TextStructSink::new();
        sink.begin_map();
        sink.map_property("a");
        assert_eq!(sink.depth(), 2);
        sink.end_map();
        sink.end_map();
        assert_eq!(sink.depth(), 0);
    }

    #[test]
    fn unbalanced_end_is_ignored() {
        for keep in [false, true] {
            let mut sink = TextStructSink::with_outermost_brackets(keep);
            sink.end_map();
            sink.end_list();
            assert_eq!(sink.as_str(), "");
            assert_eq!(sink.depth(), 0);
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_values_render() {
        let value = serde_json::json!({"a": 1, "b": [true, "x"], "c": null});
        assert_eq!(render(&value, false), r#"a: 1, b: [true, "x"]"#);
        assert_eq!(render(&serde_json::json!(1.5), false), "1.5");
    }
}
