use std::{fmt, ptr};

/// Static type tag of an exception class.
///
/// Every concrete exception type owns exactly one `ExcType` in static storage.
/// Tags link to their base tag, forming a single-inheritance tree rooted at
/// [`Exception`](crate::Exception). The tree exists only as these links: there is
/// no separate object describing the hierarchy.
///
/// Two tags are the same class when they are the same static, so equality is
/// address identity rather than name comparison.
pub struct ExcType {
    name: &'static str,
    /// Resolved on use: the base tag of a generated class lives in a static
    /// inside its `ExcClass::class()` accessor.
    base: Option<fn() -> &'static ExcType>,
}

impl ExcType {
    /// Suffix appended to the canonical name by [`ExcType::type_string`].
    pub const POINTER_SUFFIX: &'static str = " *";

    /// Creates the tag of a class with no base.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, base: None }
    }

    /// Creates the tag of a class derived from the class whose tag `base` returns.
    #[must_use]
    pub const fn derived(name: &'static str, base: fn() -> &'static ExcType) -> Self {
        Self { name, base: Some(base) }
    }

    /// The canonical, fully-qualified name, e.g. `"InvalidParameterError"` or `"failer::MyException"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment of the canonical name.
    ///
    /// Both `::` and `.` are accepted as separators, so `"failer::MyException"`
    /// and `"failer.MyException"` both yield `"MyException"`.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.name;
        let start = name
            .rfind("::")
            .map(|i| i + 2)
            .into_iter()
            .chain(name.rfind('.').map(|i| i + 1))
            .max()
            .unwrap_or(0);
        &name[start..]
    }

    /// The tag of the direct base class, `None` for the root.
    #[must_use]
    pub fn base(&self) -> Option<&'static Self> {
        self.base.map(|base| base())
    }

    /// Iterates this tag followed by each of its ancestors up to the root.
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static Self> {
        std::iter::successors(Some(self), |exc_type| exc_type.base())
    }

    /// Number of base links between this tag and the root.
    #[must_use]
    pub fn depth(&'static self) -> usize {
        self.lineage().count() - 1
    }

    /// Checks if this class is `handler_type` or one of its subclasses.
    ///
    /// Returns true if an exception of this class would be caught by a handler
    /// written for `handler_type`.
    #[must_use]
    pub fn is_subclass_of(&'static self, handler_type: &Self) -> bool {
        self.lineage().any(|exc_type| ptr::eq(exc_type, handler_type))
    }

    /// The programmatic type string: the canonical name followed by `" *"`.
    #[must_use]
    pub fn type_string(&self) -> String {
        format!("{}{}", self.name, Self::POINTER_SUFFIX)
    }
}

impl PartialEq for ExcType {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for ExcType {}

impl fmt::Debug for ExcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcType")
            .field("name", &self.name)
            .field("base", &self.base().map(Self::name))
            .finish()
    }
}

impl fmt::Display for ExcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
