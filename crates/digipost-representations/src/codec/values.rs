//! # Leaf Values
//!
//! Lexical forms of simple values carried in text content and attributes.
//! Date-times are RFC 3339 with an explicit offset, which is preserved, as is
//! sub-second precision. Dates are `YYYY-MM-DD`. Nothing depends on the host
//! locale or timezone.

use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use url::Url;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value with a single text form.
pub trait XmlValue: Sized {
    fn to_xml_value(&self) -> String;

    /// `element` and `field` locate the value for error reporting.
    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError>;
}

fn invalid(element: &str, field: &str, reason: impl std::fmt::Display) -> RepresentationError {
    RepresentationError::schema(element, field, reason.to_string())
}

impl XmlValue for String {
    fn to_xml_value(&self) -> String {
        self.clone()
    }

    fn from_xml_value(raw: &str, _: &str, _: &str) -> Result<Self, RepresentationError> {
        Ok(raw.to_string())
    }
}

macro_rules! numeric_xml_value {
    ($($ty:ty),+) => {
        $(
            impl XmlValue for $ty {
                fn to_xml_value(&self) -> String {
                    self.to_string()
                }

                fn from_xml_value(
                    raw: &str,
                    element: &str,
                    field: &str,
                ) -> Result<Self, RepresentationError> {
                    raw.trim().parse().map_err(|e| invalid(element, field, e))
                }
            }
        )+
    };
}

numeric_xml_value!(u32, u64, i64);

impl XmlValue for bool {
    fn to_xml_value(&self) -> String {
        self.to_string()
    }

    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError> {
        match raw.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(invalid(element, field, format!("not a boolean: {other}"))),
        }
    }
}

impl XmlValue for Uuid {
    fn to_xml_value(&self) -> String {
        self.to_string()
    }

    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError> {
        Uuid::parse_str(raw.trim()).map_err(|e| invalid(element, field, e))
    }
}

impl XmlValue for Url {
    fn to_xml_value(&self) -> String {
        self.to_string()
    }

    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError> {
        Url::parse(raw.trim()).map_err(|e| invalid(element, field, e))
    }
}

impl XmlValue for DateTime<FixedOffset> {
    fn to_xml_value(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError> {
        DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| invalid(element, field, e))
    }
}

impl XmlValue for NaiveDate {
    fn to_xml_value(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }

    fn from_xml_value(raw: &str, element: &str, field: &str) -> Result<Self, RepresentationError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| invalid(element, field, e))
    }
}
