//! Python literal formatting

use std::fmt;

/// A float as a Python literal
///
/// Uses the shortest text that reads back to the same `f32`, always with a
/// decimal point so Python parses it as a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyFloat(pub f32);

impl fmt::Display for PyFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("float('nan')");
        }
        if value.is_infinite() {
            return f.write_str(if value > 0.0 { "float('inf')" } else { "float('-inf')" });
        }

        let text = value.to_string();
        if text.contains(['.', 'e', 'E']) {
            f.write_str(&text)
        } else {
            write!(f, "{}.0", text)
        }
    }
}

/// A string as a single-quoted Python literal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyStr<'a>(pub &'a str);

impl fmt::Display for PyStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        for c in self.0.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '\'' => f.write_str("\\'")?,
                c if c.is_ascii_control() => write!(f, "\\x{:02x}", c as u32)?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("'")
    }
}

/// A fixed-size float tuple, `(a, b, c)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyTuple<const N: usize>(pub [f32; N]);

impl<const N: usize> fmt::Display for PyTuple<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", PyFloat(*value))?;
        }
        f.write_str(")")
    }
}

/// A `(vertex, weight)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyPair(pub u32, pub f32);

impl fmt::Display for PyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, PyFloat(self.1))
    }
}

/// An optional string, `None` when absent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyOptStr<'a>(pub Option<&'a str>);

impl fmt::Display for PyOptStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(text) => write!(f, "{}", PyStr(text)),
            None => f.write_str("None"),
        }
    }
}
