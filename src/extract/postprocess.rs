use serde::Deserialize;

/// A deterministic text transform applied to a raw extracted value
///
/// The set of transforms is closed; new kinds are added as variants and
/// dispatched through [`Postprocessor::apply`].
///
/// In TOML a step is written as a tagged table:
///
/// ```toml
/// postprocessors = [{ kind = "replace", from = ",", to = "" }, { kind = "strip" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Postprocessor {
    /// Replace every occurrence of `from` with `to` (empty when omitted)
    Replace {
        from: String,
        #[serde(default)]
        to: String,
    },

    /// Remove leading and trailing whitespace
    Strip,
}

impl Postprocessor {
    /// Shorthand for a replace step
    pub fn replace(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Replace {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Applies this transform to `input`
    pub fn apply(&self, input: &str) -> String {
        match self {
            // An empty pattern would interleave `to` between every character
            Self::Replace { from, .. } if from.is_empty() => input.to_string(),
            Self::Replace { from, to } => input.replace(from.as_str(), to),
            Self::Strip => input.trim().to_string(),
        }
    }
}

/// Applies each step of `chain` in declared order, feeding each step the
/// output of the previous one
///
/// An empty chain returns the input unchanged.
///
/// # Example
///
/// ```
/// use course_harvest::extract::{apply_chain, Postprocessor};
///
/// let chain = vec![
///     Postprocessor::replace(",", ""),
///     Postprocessor::replace("ratings", ""),
///     Postprocessor::Strip,
/// ];
/// assert_eq!(apply_chain(&chain, "12,345 ratings"), "12345");
/// ```
pub fn apply_chain(chain: &[Postprocessor], input: &str) -> String {
    chain
        .iter()
        .fold(input.to_string(), |value, step| step.apply(&value))
}
