//! Line bookkeeping.
//!
//! Every value gets a [`Symbol`] when it is frozen, and the command builder
//! records the paragraph-local line of that symbol in [`Diagnostics`]. Once a
//! paragraph has been parsed the segmenter drains those records, shifts them
//! by the paragraph's starting line and reports them to a [`SymbolSink`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::Value;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u64);

impl Symbol {
    pub(crate) fn fresh() -> Self {
        Symbol(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Paragraph-local line records for values built during one parse.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pending: Vec<(Symbol, usize)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a symbol for a value starting at `line`.
    pub fn register(&mut self, line: usize) -> Symbol {
        let symbol = Symbol::fresh();
        self.pending.push((symbol, line));
        symbol
    }

    /// Take the records made so far, shifted by `offset`.
    pub fn drain_rebased(&mut self, offset: usize) -> HashMap<Symbol, usize> {
        self.pending
            .drain(..)
            .map(|(symbol, line)| (symbol, line + offset))
            .collect()
    }

    pub fn discard(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Receives the document-absolute line of every emitted value.
pub trait SymbolSink {
    fn register(&mut self, value: &Value, line: usize);
}

impl<F: FnMut(&Value, usize)> SymbolSink for F {
    fn register(&mut self, value: &Value, line: usize) {
        self(value, line)
    }
}

/// A [`SymbolSink`] that remembers lines by value identity.
#[derive(Debug, Default, Clone)]
pub struct SymbolRegistry {
    lines: HashMap<Symbol, usize>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_of(&self, value: &Value) -> Option<usize> {
        self.lines.get(&value.symbol()).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl SymbolSink for SymbolRegistry {
    fn register(&mut self, value: &Value, line: usize) {
        self.lines.insert(value.symbol(), line);
    }
}

/// Maps byte offsets in a text to zero-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        LineIndex {
            newlines: memchr::memchr_iter(b'\n', text.as_bytes()).collect(),
        }
    }

    pub fn line_at(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset)
    }

    pub fn line_count(&self) -> usize {
        self.newlines.len() + 1
    }
}
