//! `NestingStack` — Bit-packed stack of booleans
//!
//! Used by the structure serializer to remember, per open container, whether
//! an element has already been written. One bit per level, packed into `u64`
//! words, so nesting depth costs one allocation per 64 levels.

const WORD_BITS: u8 = 64;

/// A LIFO stack of `bool` packed 64 to a word.
///
/// The top of the stack is always bit 0 of the last word. `fill` counts the
/// bits in use in that word (`1..=64` while non-empty).
#[derive(Debug, Clone, Default)]
pub struct NestingStack {
    words: Vec<u64>,
    fill: u8,
}

impl NestingStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is on the stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.words.len() {
            0 => 0,
            n => (n - 1) * usize::from(WORD_BITS) + usize::from(self.fill),
        }
    }

    /// Push a value.
    pub fn push(&mut self, value: bool) {
        match self.words.last_mut() {
            Some(word) if self.fill < WORD_BITS => {
                *word = (*word << 1) | u64::from(value);
                self.fill += 1;
            }
            _ => {
                self.words.push(u64::from(value));
                self.fill = 1;
            }
        }
    }

    /// Pop the top value, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<bool> {
        let word = self.words.last_mut()?;
        let top = *word & 1 != 0;
        if self.fill == 1 {
            self.words.pop();
            self.fill = if self.words.is_empty() { 0 } else { WORD_BITS };
        } else {
            *word >>= 1;
            self.fill -= 1;
        }
        Some(top)
    }

    /// Peek at the top value.
    #[must_use]
    pub fn top(&self) -> Option<bool> {
        self.words.last().map(|word| word & 1 != 0)
    }

    /// Overwrite the top value in place. No-op on an empty stack.
    pub fn replace(&mut self, value: bool) {
        if let Some(word) = self.words.last_mut() {
            if value {
                *word |= 1;
            } else {
                *word &= !1;
            }
        }
    }
}
