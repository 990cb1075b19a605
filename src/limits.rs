/// Bounds applied while turning an expression into a [`crate::Program`].
///
/// Evaluation cost grows linearly with the program length, so bounding the length is how a
/// caller bounds the time spent evaluating a filter it does not control.
///
/// # Examples
///
/// ```rust
/// use postfix_filter::{Filter, Limits};
///
/// let limits = Limits::default().with_max_program_length(3);
/// assert!(Filter::with_limits(r#""A" && "B""#, &limits).is_ok());
/// assert!(Filter::with_limits(r#""A" && "B" && "C""#, &limits).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    max_depth: usize,
    max_program_length: Option<usize>,
}

impl Limits {
    const DEFAULT_MAX_DEPTH: usize = 256;

    /// Maximum nesting of parentheses, unary operators and call arguments.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum number of elements in a compiled program.
    pub fn with_max_program_length(mut self, max_program_length: usize) -> Self {
        self.max_program_length = Some(max_program_length);
        self
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn max_program_length(&self) -> Option<usize> {
        self.max_program_length
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_program_length: None,
        }
    }
}
