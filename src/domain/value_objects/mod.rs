//! Value Objects for the storefront extensions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Star rating attached to a review, 1 to 5 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if !(Self::MIN..=Self::MAX).contains(&value) { return Err(RatingError::OutOfRange(value)); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u8 { self.0 }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;
    fn try_from(value: u8) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 { r.0 }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(u8),
}

/// Phone number normalised to `+` followed by 10 to 15 digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, PhoneNumberError> {
        let raw = raw.trim();
        if raw.is_empty() { return Err(PhoneNumberError::Empty); }
        let mut digits = String::with_capacity(raw.len());
        for (i, c) in raw.chars().enumerate() {
            match c {
                '0'..='9' => digits.push(c),
                '+' if i == 0 => {}
                ' ' | '-' | '(' | ')' | '.' => {}
                _ => return Err(PhoneNumberError::InvalidCharacter(c)),
            }
        }
        if !(10..=15).contains(&digits.len()) { return Err(PhoneNumberError::InvalidLength(digits.len())); }
        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Digits only, the form SMS gateways expect.
    pub fn digits(&self) -> &str { &self.0[1..] }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<PhoneNumber> for String {
    fn from(p: PhoneNumber) -> String { p.0 }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneNumberError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("phone number must have 10 to 15 digits, got {0}")]
    InvalidLength(usize),
}

/// ISO 3166-1 alpha-2 country code, stored lower case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(value: &str) -> Result<Self, CountryCodeError> {
        let value = value.trim();
        if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid country code '{0}'")]
pub struct CountryCodeError(pub String);

/// Kind of media attached to a product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Image => "image", Self::Video => "video" }
    }
}

impl FromStr for MediaKind {
    type Err = MediaKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(MediaKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("media kind must be 'image' or 'video', got '{0}'")]
pub struct MediaKindError(pub String);

/// Accepts absolute http(s) URLs only.
pub fn is_web_url(value: &str) -> bool {
    let rest = value.strip_prefix("https://").or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange(6)));
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_phone_normalisation() {
        let p = PhoneNumber::parse("+7 (916) 123-45-67").unwrap();
        assert_eq!(p.as_str(), "+79161234567");
        assert_eq!(p.digits(), "79161234567");
        assert_eq!(PhoneNumber::parse("79161234567").unwrap(), p);
        assert_eq!(PhoneNumber::parse("12345"), Err(PhoneNumberError::InvalidLength(5)));
        assert_eq!(PhoneNumber::parse("+7916abc4567"), Err(PhoneNumberError::InvalidCharacter('a')));
    }

    #[test]
    fn test_country_code() {
        assert_eq!(CountryCode::new("DE").unwrap().as_str(), "de");
        assert!(CountryCode::new("deu").is_err());
        assert!(CountryCode::new("d1").is_err());
    }

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("Video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("gif".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_web_url() {
        assert!(is_web_url("https://cdn.example.com/a.png"));
        assert!(!is_web_url("ftp://example.com"));
        assert!(!is_web_url("https://"));
    }
}
