//! Configuration options for parsing and encoding.
//!
//! - [`EncodeOptions`]: key ordering, tabular field ordering, indentation width
//! - [`FieldOrder`]: how the field list of a tabular header is ordered
//! - [`ParseOptions`]: nesting limit for the parser
//!
//! ## Examples
//!
//! ```rust
//! use rtoon::{encode_with_options, parse, EncodeOptions, FieldOrder};
//!
//! let doc = parse("b: 2\na: 1\n").unwrap();
//!
//! let options = EncodeOptions::new().with_sort_keys(false);
//! assert_eq!(encode_with_options(&doc, &options).unwrap(), "b: 2\na: 1\n");
//!
//! let options = EncodeOptions::new().with_field_order(FieldOrder::Preserve);
//! assert_eq!(encode_with_options(&doc, &options).unwrap(), "a: 1\nb: 2\n");
//! ```

/// Ordering of the field list in a tabular schema header.
///
/// The field list is the union of the keys of every row.
///
/// # Examples
///
/// ```rust
/// use rtoon::FieldOrder;
///
/// assert_eq!(FieldOrder::default(), FieldOrder::Sorted);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FieldOrder {
    /// Alphabetical.
    #[default]
    Sorted,
    /// First-seen order across the rows.
    Preserve,
}

/// Configuration options for the encoder.
///
/// # Examples
///
/// ```rust
/// use rtoon::{EncodeOptions, FieldOrder};
///
/// let options = EncodeOptions::new();
/// assert!(options.sort_keys);
/// assert_eq!(options.field_order, FieldOrder::Sorted);
/// assert_eq!(options.indent, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Emit the keys of every mapping in alphabetical order instead of insertion order.
    pub sort_keys: bool,
    pub field_order: FieldOrder,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            sort_keys: true,
            field_order: FieldOrder::default(),
            indent: 2,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (sorted keys, sorted fields, 2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether mapping keys are emitted alphabetically.
    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Sets the ordering of tabular header fields.
    #[must_use]
    pub fn with_field_order(mut self, field_order: FieldOrder) -> Self {
        self.field_order = field_order;
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// A width of zero would flatten every block into its parent, so it is raised to one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtoon::EncodeOptions;
    ///
    /// assert_eq!(EncodeOptions::new().with_indent(4).indent, 4);
    /// assert_eq!(EncodeOptions::new().with_indent(0).indent, 1);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }
}

/// Configuration options for the parser.
///
/// # Examples
///
/// ```rust
/// use rtoon::{parse_with_options, ParseOptions};
///
/// let options = ParseOptions::new().with_max_depth(1);
/// assert!(parse_with_options("a:\n  b: 1\n", &options).is_ok());
/// assert!(parse_with_options("a:\n  b:\n    c: 1\n", &options).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest block nesting accepted. The top level is depth zero.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_depth: 128 }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deepest block nesting the parser accepts.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
