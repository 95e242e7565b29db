use core::fmt;
use core::str::FromStr;

use crate::{DirectiveError, Modifiers, TimeFormat};

// -----------------------------------------------------------------------------
// DirectiveKind

/// What a field represents in a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// The resource id. The optional name is the resource type.
    Primary,
    /// A field holding the resource type at runtime.
    Type,
    /// A client generated id, used for not yet persisted resources.
    ClientId,
    /// A member of `attributes`.
    Attr,
    /// A to-one or to-many relationship.
    Relation,
    /// A relationship whose target is chosen among several resource types.
    PolyRelation,
    /// Links merged into the node (or stored under the name).
    Links,
    /// Meta merged into the node (or stored under the name).
    Meta,
}

impl DirectiveKind {
    /// Parse a kind token, accepting the common spellings.
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "primary" => Self::Primary,
            "type" => Self::Type,
            "client_id" | "client-id" => Self::ClientId,
            "attr" | "attribute" => Self::Attr,
            "relation" => Self::Relation,
            "poly_relation" | "polyrelation" => Self::PolyRelation,
            "links" => Self::Links,
            "meta" => Self::Meta,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical token of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Type => "type",
            Self::ClientId => "client_id",
            Self::Attr => "attr",
            Self::Relation => "relation",
            Self::PolyRelation => "poly_relation",
            Self::Links => "links",
            Self::Meta => "meta",
        }
    }

    /// Whether the kind is meaningless without a name.
    pub const fn requires_name(self) -> bool {
        matches!(self, Self::Attr | Self::Relation | Self::PolyRelation)
    }

    /// `relation` or `poly_relation`.
    pub const fn is_relationship(self) -> bool {
        matches!(self, Self::Relation | Self::PolyRelation)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Directive

/// A parsed field annotation.
///
/// See the [crate-level documentation](crate) for the grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    kind: DirectiveKind,
    name: Option<String>,
    modifiers: Modifiers,
    ignored: Vec<String>,
}

impl Directive {
    /// Creates a directive without name or modifiers.
    #[inline]
    pub const fn new(kind: DirectiveKind) -> Self {
        Self {
            kind,
            name: None,
            modifiers: Modifiers::empty(),
            ignored: Vec::new(),
        }
    }

    /// Sets the name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds modifiers.
    #[inline]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Parse an annotation string.
    ///
    /// # Examples
    ///
    /// ```
    /// use hd_directive::{Directive, DirectiveError, DirectiveKind};
    ///
    /// let d = Directive::parse("relation,coauthors,future_flag").unwrap();
    /// assert_eq!(d.kind(), DirectiveKind::Relation);
    /// assert_eq!(d.name(), Some("coauthors"));
    /// assert_eq!(d.ignored(), ["future_flag"]);
    ///
    /// assert_eq!(
    ///     Directive::parse("attr,omitempty"),
    ///     Err(DirectiveError::MissingName(DirectiveKind::Attr)),
    /// );
    /// ```
    pub fn parse(annotation: &str) -> Result<Self, DirectiveError> {
        let trimmed = annotation.trim();
        if trimmed.is_empty() {
            return Err(DirectiveError::Empty);
        }

        let mut tokens = trimmed.split(',').map(str::trim);
        let Some(head) = tokens.next() else {
            return Err(DirectiveError::Empty);
        };

        let (kind_token, suffix) = match head.split_once(':') {
            Some((kind, name)) => (kind.trim(), Some(name.trim())),
            None => (head, None),
        };

        let kind = DirectiveKind::from_token(kind_token)
            .ok_or_else(|| DirectiveError::UnknownKind(kind_token.to_owned()))?;

        let mut name = match suffix {
            Some("") => return Err(DirectiveError::EmptyName(kind)),
            Some(name) => Some(name.to_owned()),
            None => None,
        };

        let mut modifiers = Modifiers::empty();
        let mut ignored = Vec::new();
        let mut positional = name.is_none();

        for token in tokens {
            if token.is_empty() {
                positional = false;
                continue;
            }
            if positional && Modifiers::is_word_alias(token) {
                name = Some(token.to_owned());
            } else if let Some(flag) = Modifiers::from_token(token) {
                modifiers |= flag;
            } else if positional {
                name = Some(token.to_owned());
            } else {
                ignored.push(token.to_owned());
            }
            positional = false;
        }

        if name.is_none() && kind.requires_name() {
            return Err(DirectiveError::MissingName(kind));
        }

        if modifiers.intersection(Modifiers::TIME_FORMATS).bits().count_ones() > 1 {
            return Err(DirectiveError::ConflictingTimeFormats {
                annotation: trimmed.to_owned(),
            });
        }

        Ok(Self {
            kind,
            name,
            modifiers,
            ignored,
        })
    }

    /// Returns the kind.
    #[inline]
    pub const fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// Returns the name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the modifier set.
    #[inline]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub const fn omit_if_empty(&self) -> bool {
        self.modifiers.contains(Modifiers::OMIT_IF_EMPTY)
    }

    #[inline]
    pub const fn omit_if_zero(&self) -> bool {
        self.modifiers.contains(Modifiers::OMIT_IF_ZERO)
    }

    /// The time format selected by the modifiers.
    #[inline]
    pub fn time_format(&self) -> TimeFormat {
        TimeFormat::from(self.modifiers)
    }

    /// Tokens that matched neither a name nor a modifier.
    #[inline]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }
}

impl FromStr for Directive {
    type Err = DirectiveError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(name) = &self.name {
            write!(f, ":{name}")?;
        }
        for flag in self.modifiers.iter() {
            if let Some(token) = flag.token() {
                write!(f, ",{token}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Directive, DirectiveKind};
    use crate::{DirectiveError, Modifiers, TimeFormat};

    #[test]
    fn colon_and_positional_names() {
        let a = Directive::parse("relation:coauthors").unwrap();
        let b = Directive::parse("relation,coauthors").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), Some("coauthors"));
    }

    #[test]
    fn positional_modifier_is_not_a_name() {
        let d = Directive::parse("meta,omitempty").unwrap();
        assert_eq!(d.kind(), DirectiveKind::Meta);
        assert_eq!(d.name(), None);
        assert!(d.omit_if_empty());
    }

    #[test]
    fn word_aliases_in_the_name_slot_are_names() {
        for name in ["date", "time", "unix"] {
            let d = Directive::parse(&format!("attr,{name}")).unwrap();
            assert_eq!(d.name(), Some(name));
            assert!(d.modifiers().is_empty());
        }

        let d = Directive::parse("attr,date,omit_if_empty").unwrap();
        assert_eq!(d.name(), Some("date"));
        assert!(d.omit_if_empty());

        let d = Directive::parse("attr,time,time").unwrap();
        assert_eq!(d.name(), Some("time"));
        assert_eq!(d.time_format(), TimeFormat::TimeOnly);

        // Canonical modifier words still never become names.
        assert_eq!(
            Directive::parse("attr,date_only"),
            Err(DirectiveError::MissingName(DirectiveKind::Attr))
        );
    }

    #[test]
    fn name_only_taken_from_second_token() {
        let d = Directive::parse("attr:title,headline,omit_if_zero").unwrap();
        assert_eq!(d.name(), Some("title"));
        assert_eq!(d.ignored(), ["headline"]);
        assert!(d.omit_if_zero());
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let d = Directive::parse(" attr , title , shiny , rfc3339 ").unwrap();
        assert_eq!(d.name(), Some("title"));
        assert_eq!(d.ignored(), ["shiny"]);
        assert_eq!(d.time_format(), TimeFormat::Rfc3339);
    }

    #[test]
    fn primary_name_is_optional() {
        assert_eq!(Directive::parse("primary").unwrap().name(), None);
        assert_eq!(
            Directive::parse("primary,articles").unwrap().name(),
            Some("articles")
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(Directive::parse("  "), Err(DirectiveError::Empty));
        assert_eq!(
            Directive::parse("attribute:"),
            Err(DirectiveError::EmptyName(DirectiveKind::Attr))
        );
        assert_eq!(
            Directive::parse("field,name"),
            Err(DirectiveError::UnknownKind("field".into()))
        );
        assert_eq!(
            Directive::parse("poly_relation"),
            Err(DirectiveError::MissingName(DirectiveKind::PolyRelation))
        );
        assert!(matches!(
            Directive::parse("attr,at,timestamp,date_only"),
            Err(DirectiveError::ConflictingTimeFormats { .. })
        ));
    }

    #[test]
    fn display_is_canonical() {
        let d = Directive::parse("attribute,born,date,omitempty,whatever").unwrap();
        assert_eq!(d.to_string(), "attr:born,omit_if_empty,date_only");
        assert_eq!(Directive::parse(&d.to_string()).unwrap().modifiers(), d.modifiers());
    }

    #[test]
    fn builder() {
        let d = Directive::new(DirectiveKind::Attr)
            .with_name("at")
            .with_modifiers(Modifiers::TIMESTAMP);
        assert_eq!(d, Directive::parse("attr:at,timestamp").unwrap());
    }
}
