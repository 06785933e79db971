/// A single parameter slot of a compound declaration name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// An external argument label, e.g. the `a` in `foo(a:)`.
    Named(String),
    /// An unnamed slot, spelled `_` (or empty) in the compound form.
    Wildcard,
}

impl Parameter {
    /// The label as it appears in a declaration: `_` for unnamed slots.
    pub fn label_or_underscore(&self) -> &str {
        match self {
            Parameter::Named(label) => label,
            Parameter::Wildcard => "_",
        }
    }

    /// The label as it appears at a call site: empty for unnamed slots.
    pub fn label_or_empty(&self) -> &str {
        match self {
            Parameter::Named(label) => label,
            Parameter::Wildcard => "",
        }
    }
}

/// A function-like declaration name carrying ordered argument labels,
/// written `base(label1:label2:)`. A name without parentheses has an
/// empty parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundName {
    pub base_name: String,
    pub parameters: Vec<Parameter>,
}

impl CompoundName {
    /// Parse a compound name. Total: any input yields a name.
    ///
    /// Without a `(` the whole string is the base name. Otherwise the
    /// base is the text before `(` and the parenthesized body splits on
    /// `:`, one parameter per label, dropping the empty segment after
    /// the final `:`. Empty and `_` labels are wildcards.
    pub fn parse(name: &str) -> CompoundName {
        let Some(paren) = name.find('(') else {
            return CompoundName {
                base_name: name.to_string(),
                parameters: Vec::new(),
            };
        };

        let base_name = name[..paren].to_string();
        let body = name[paren + 1..].trim_end_matches(')');

        let mut segments: Vec<&str> = body.split(':').collect();
        // The segment after the final `:` (or the sole segment of an
        // empty body) is not a label.
        segments.pop();

        let parameters = segments
            .into_iter()
            .map(|label| match label {
                "" | "_" => Parameter::Wildcard,
                other => Parameter::Named(other.to_string()),
            })
            .collect();

        CompoundName {
            base_name,
            parameters,
        }
    }

    /// Reconstruct the textual form: `base(label1:label2:)` with `_`
    /// for wildcards, or the bare base name for zero parameters.
    pub fn render(&self) -> String {
        if self.parameters.is_empty() {
            return self.base_name.clone();
        }
        let mut out = String::with_capacity(self.base_name.len() + 2);
        out.push_str(&self.base_name);
        out.push('(');
        for parameter in &self.parameters {
            out.push_str(parameter.label_or_underscore());
            out.push(':');
        }
        out.push(')');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(label: &str) -> Parameter {
        Parameter::Named(label.to_string())
    }

    #[test]
    fn test_parse_plain_name() {
        let name = CompoundName::parse("foo");
        assert_eq!(name.base_name, "foo");
        assert!(name.parameters.is_empty());
    }

    #[test]
    fn test_parse_named_labels() {
        let name = CompoundName::parse("foo(a:b:)");
        assert_eq!(name.base_name, "foo");
        assert_eq!(name.parameters, vec![named("a"), named("b")]);
    }

    #[test]
    fn test_parse_wildcard_label() {
        let name = CompoundName::parse("foo(_:b:)");
        assert_eq!(name.parameters, vec![Parameter::Wildcard, named("b")]);
    }

    #[test]
    fn test_parse_bare_colon() {
        let name = CompoundName::parse("foo(:)");
        assert_eq!(name.parameters, vec![Parameter::Wildcard]);
    }

    #[test]
    fn test_parse_empty_parens() {
        let name = CompoundName::parse("foo()");
        assert!(name.parameters.is_empty());
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(CompoundName::parse("init").render(), "init");
    }

    #[test]
    fn test_render_labels() {
        assert_eq!(
            CompoundName::parse("perform(action:with:)").render(),
            "perform(action:with:)"
        );
        assert_eq!(CompoundName::parse("foo(_:x:)").render(), "foo(_:x:)");
    }

    #[test]
    fn test_parse_render_round_trip() {
        for input in ["foo", "foo(a:)", "foo(a:b:)", "foo(_:b:)", "foo(:)", "do(task:along:)"] {
            let parsed = CompoundName::parse(input);
            assert_eq!(CompoundName::parse(&parsed.render()), parsed, "{input}");
        }
    }

    #[test]
    fn test_label_accessors() {
        assert_eq!(named("x").label_or_underscore(), "x");
        assert_eq!(Parameter::Wildcard.label_or_underscore(), "_");
        assert_eq!(named("x").label_or_empty(), "x");
        assert_eq!(Parameter::Wildcard.label_or_empty(), "");
    }
}
