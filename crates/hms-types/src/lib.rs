/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a phone number of 9 to 12 digits
    #[error("Phone must be {min}-{max} digits, got: '{0}'", min = PhoneNumber::MIN_DIGITS, max = PhoneNumber::MAX_DIGITS)]
    InvalidPhone(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match, used by the search helpers.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A contact phone number made of 9 to 12 ASCII digits.
///
/// Whitespace around the input is trimmed; no other normalisation (spaces, `+`, dashes) is
/// applied, matching the forms staff fill in at the front desk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 9;
    pub const MAX_DIGITS: usize = 12;

    /// Creates a new `PhoneNumber`, rejecting anything that is not 9-12 digits.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        let ok = (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&trimmed.len())
            && trimmed.bytes().all(|b| b.is_ascii_digit());
        if !ok {
            return Err(TextError::InvalidPhone(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parses optional form input: blank means "no phone on file".
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>, TextError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Dr. Omar Khaled ").unwrap();
        assert_eq!(text.as_str(), "Dr. Omar Khaled");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn test_contains_ignore_case() {
        let text = NonEmptyText::new("Dermatology").unwrap();
        assert!(text.contains_ignore_case("DERMA"));
        assert!(!text.contains_ignore_case("neuro"));
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"   \"");
        assert!(result.is_err());
    }

    #[test]
    fn test_phone_accepts_nine_to_twelve_digits() {
        assert!(PhoneNumber::new("078123456").is_ok());
        assert!(PhoneNumber::new("0781234567").is_ok());
        assert!(PhoneNumber::new("962781234567").is_ok());
    }

    #[test]
    fn test_phone_rejects_short_long_and_symbols() {
        assert!(PhoneNumber::new("07812345").is_err());
        assert!(PhoneNumber::new("9627812345678").is_err());
        assert!(PhoneNumber::new("+962781234").is_err());
    }

    #[test]
    fn test_phone_parse_optional_treats_blank_as_none() {
        assert_eq!(PhoneNumber::parse_optional(None).unwrap(), None);
        assert_eq!(PhoneNumber::parse_optional(Some("  ")).unwrap(), None);
        assert!(PhoneNumber::parse_optional(Some("0790000001"))
            .unwrap()
            .is_some());
        assert!(PhoneNumber::parse_optional(Some("12ab")).is_err());
    }
}
