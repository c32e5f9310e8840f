use std::ops::{Deref, DerefMut};
use indexmap::IndexSet;

/// Declared-type uses currently being visited, outermost first. Keys are the
/// rendered use (`java.util.List<com.acme.Node>`), so nested uses of one
/// generic type are distinct entries.
#[derive(Debug, Default)]
pub struct RecursionStack {
    names: IndexSet<String>,
}

impl RecursionStack {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize { self.names.len() }

    /// Entries for uses of the declared type `name`, whatever their arguments.
    pub fn uses_of(&self, name: &str) -> usize {
        self.names
            .iter()
            .filter(|key| {
                key.strip_prefix(name)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('<'))
            })
            .count()
    }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    /// Push `name` for the lifetime of the returned frame.
    ///
    /// The frame derefs to the stack so nested visits keep threading it; the
    /// entry is popped when the frame drops, on every exit path.
    pub fn enter(&mut self, name: &str) -> Frame<'_> {
        debug_assert!(!self.contains(name), "{name} is already being visited");
        self.names.insert(name.to_string());
        Frame { stack: self }
    }
}

pub struct Frame<'a> {
    stack: &'a mut RecursionStack,
}

impl Deref for Frame<'_> {
    type Target = RecursionStack;
    fn deref(&self) -> &RecursionStack { self.stack }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut RecursionStack { self.stack }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.stack.names.pop();
    }
}
