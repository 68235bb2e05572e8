//! Per-call execution context handed to command handlers.
//!
//! Handlers read parsed flag values from it and write their output into it.
//! The writer is owned by the caller of `CommandTree::execute`, so two
//! invocations never share an output sink.

use std::io::{self, Write};

use clap::ArgMatches;

use super::tree::ARGS_KEY;

pub struct Invocation<'a> {
    matches: &'a ArgMatches,
    out: &'a mut dyn Write,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(matches: &'a ArgMatches, out: &'a mut dyn Write) -> Self {
        Self { matches, out }
    }

    /// Value of a `string` (or unknown-tag) flag.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.matches.try_get_one::<i64>(name).ok().flatten().copied()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.matches.try_get_one::<bool>(name).ok().flatten().copied()
    }

    /// Value of a `float64` or `float32` flag.
    pub fn float(&self, name: &str) -> Option<f64> {
        if let Some(v) = self.matches.try_get_one::<f64>(name).ok().flatten() {
            return Some(*v);
        }
        self.matches
            .try_get_one::<f32>(name)
            .ok()
            .flatten()
            .map(|v| f64::from(*v))
    }

    /// Trailing positional tokens, in order.
    pub fn args(&self) -> Vec<&str> {
        self.matches
            .try_get_many::<String>(ARGS_KEY)
            .ok()
            .flatten()
            .map(|values| values.map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}

impl Write for Invocation<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
