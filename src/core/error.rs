//! Typed failures of a rewrite pass.

/// Errors raised by the scanner when strict behaviour is requested or when
/// a classifier cannot be built from the configured literals.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError
{
    /// Handler body ran to end of input without closing its braces
    #[error("handler starting at line {line} never closes its body")]
    UnclosedHandler
    {
        line: usize
    },

    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}
