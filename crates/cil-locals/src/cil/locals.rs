use crate::{Error, Result};

/// Largest locals signature a method body can address: `ldloc`/`stloc`
/// take indices `0..=0xFFFE`.
pub const MAX_LOCALS: usize = 0xFFFF;

/// A local variable declared in a method body.
///
/// Instructions never own locals; they borrow them from the [`LocalsTable`]
/// of the method being rewritten, so two instructions naming the same local
/// point at the same `LocalVariable`.
#[derive(Debug, PartialEq, Eq)]
pub struct LocalVariable {
    index: u16,
    type_name: String,
    pinned: bool,
}

impl LocalVariable {
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.pinned
    }
}

/// Locals signature of a method, in declaration order.
#[derive(Debug, Default)]
pub struct LocalsTable {
    locals: Vec<LocalVariable>,
}

impl LocalsTable {
    #[must_use]
    pub const fn new() -> Self {
        Self { locals: Vec::new() }
    }

    /// Declare a new local and return its slot index.
    ///
    /// Fails once the table holds [`MAX_LOCALS`] locals.
    pub fn declare(&mut self, type_name: impl Into<String>, pinned: bool) -> Result<u16> {
        let index = u16::try_from(self.locals.len())
            .ok()
            .filter(|&index| usize::from(index) < MAX_LOCALS)
            .ok_or(Error::TooManyLocals)?;
        self.locals.push(LocalVariable {
            index,
            type_name: type_name.into(),
            pinned,
        });
        Ok(index)
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&LocalVariable> {
        self.locals.get(usize::from(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalVariable> {
        self.locals.iter()
    }
}
