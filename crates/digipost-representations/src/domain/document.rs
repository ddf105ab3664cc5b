//! # Documents
//!
//! A document is one file of a message: the primary letter or an attachment.
//! Delivery options (authentication, sensitivity, notifications) are set per
//! document.

use super::link::{Link, Linked, Relation};
use crate::codec::{Children, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt;
use uuid::Uuid;

xml_enum! {
    /// Login strength the recipient needs to open the document.
    pub enum AuthenticationLevel in "authentication-level" {
        Password => "PASSWORD",
        TwoFactor => "TWO_FACTOR",
        IdPorten3 => "IDPORTEN_3",
        IdPorten4 => "IDPORTEN_4",
    }
}

impl Default for AuthenticationLevel {
    fn default() -> Self {
        Self::Password
    }
}

xml_enum! {
    pub enum SensitivityLevel in "sensitivity-level" {
        Normal => "NORMAL",
        Sensitive => "SENSITIVE",
    }
}

impl Default for SensitivityLevel {
    fn default() -> Self {
        Self::Normal
    }
}

/// File type as a lowercase extension, e.g. `pdf`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileType(String);

impl FileType {
    pub fn new(extension: impl AsRef<str>) -> Self {
        Self(
            extension
                .as_ref()
                .trim()
                .trim_start_matches('.')
                .to_ascii_lowercase(),
        )
    }

    pub fn pdf() -> Self {
        Self::new("pdf")
    }

    pub fn html() -> Self {
        Self::new("html")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SMS notification, either relative to delivery or at fixed times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmsNotification {
    pub after_hours: Vec<u32>,
    pub at: Vec<DateTime<FixedOffset>>,
}

impl XmlCodec for SmsNotification {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaves("after-hours", &self.after_hours)
            .leaves("at", &self.at)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let notification = Self {
            after_hours: children.leaves("after-hours")?,
            at: children.leaves("at")?,
        };
        children.finish()?;
        Ok(notification)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailNotification {
    pub email_address: String,
    pub subject: String,
    pub text: String,
    pub at: Vec<DateTime<FixedOffset>>,
}

impl XmlCodec for EmailNotification {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("email-address", &self.email_address)
            .leaf("subject", &self.subject)
            .leaf("text", &self.text)
            .leaves("at", &self.at)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let notification = Self {
            email_address: children.leaf("email-address")?,
            subject: children.leaf("subject")?,
            text: children.leaf("text")?,
            at: children.leaves("at")?,
        };
        children.finish()?;
        Ok(notification)
    }
}

/// Payment details for an invoice document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoice {
    pub kid: String,
    /// Decimal amount in NOK, e.g. `1234.50`.
    amount: String,
    pub account: String,
    pub due_date: NaiveDate,
}

impl Invoice {
    pub fn new(
        kid: impl Into<String>,
        amount: impl Into<String>,
        account: impl Into<String>,
        due_date: NaiveDate,
    ) -> Result<Self, RepresentationError> {
        let amount = amount.into();
        validate_amount(&amount).map_err(|reason| RepresentationError::InvalidValue {
            field: "amount",
            reason,
        })?;
        Ok(Self {
            kid: kid.into(),
            amount,
            account: account.into(),
            due_date,
        })
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

fn validate_amount(amount: &str) -> Result<(), String> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(fraction) || fraction.len() > 2 {
        return Err(format!("not a decimal amount: {amount}"));
    }
    Ok(())
}

impl XmlCodec for Invoice {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("kid", &self.kid)
            .leaf("amount", &self.amount)
            .leaf("account", &self.account)
            .leaf("due-date", &self.due_date)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let kid: String = children.leaf("kid")?;
        let amount: String = children.leaf("amount")?;
        let account: String = children.leaf("account")?;
        let due_date: NaiveDate = children.leaf("due-date")?;
        children.finish()?;
        Invoice::new(kid, amount.trim(), account, due_date).map_err(|e| {
            RepresentationError::schema(&element.name, "amount", e.to_string())
        })
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub uuid: Uuid,
    pub subject: Option<String>,
    pub file_type: FileType,
    pub opening_receipt: Option<String>,
    pub sms_notification: Option<SmsNotification>,
    pub email_notification: Option<EmailNotification>,
    pub authentication_level: AuthenticationLevel,
    pub sensitivity_level: SensitivityLevel,
    pub pre_encrypt: bool,
    /// Marks a technical attachment, which is not shown to the recipient.
    pub technical_type: Option<String>,
    pub invoice: Option<Invoice>,
    pub links: Vec<Link>,
}

impl Document {
    pub fn new(uuid: Uuid, subject: impl Into<String>, file_type: FileType) -> Self {
        Self {
            uuid,
            subject: Some(subject.into()),
            file_type,
            opening_receipt: None,
            sms_notification: None,
            email_notification: None,
            authentication_level: AuthenticationLevel::default(),
            sensitivity_level: SensitivityLevel::default(),
            pre_encrypt: false,
            technical_type: None,
            invoice: None,
            links: Vec::new(),
        }
    }

    /// An attachment meant for machines: no subject, tagged with its type.
    pub fn technical_attachment(file_type: FileType, technical_type: impl Into<String>) -> Self {
        Self {
            subject: None,
            technical_type: Some(technical_type.into()),
            ..Self::new(Uuid::new_v4(), String::new(), file_type)
        }
    }

    pub fn with_authentication_level(mut self, level: AuthenticationLevel) -> Self {
        self.authentication_level = level;
        self
    }

    pub fn with_sensitivity_level(mut self, level: SensitivityLevel) -> Self {
        self.sensitivity_level = level;
        self
    }

    pub fn with_sms_notification(mut self, notification: SmsNotification) -> Self {
        self.sms_notification = Some(notification);
        self
    }

    pub fn with_email_notification(mut self, notification: EmailNotification) -> Self {
        self.email_notification = Some(notification);
        self
    }

    pub fn with_opening_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.opening_receipt = Some(receipt.into());
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoice = Some(invoice);
        self
    }

    /// Content is encrypted by the sender before upload. The client does not
    /// encrypt, so `OngoingDelivery::add_content` refuses such documents.
    pub fn pre_encrypted(mut self) -> Self {
        self.pre_encrypt = true;
        self
    }

    pub fn is_technical(&self) -> bool {
        self.technical_type.is_some()
    }

    pub fn add_content_link(&self) -> Option<&Link> {
        self.link(&Relation::AddContent)
    }
}

impl Linked for Document {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for Document {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("uuid", &self.uuid)
            .opt_leaf("subject", self.subject.as_ref())
            .leaf("file-type", &self.file_type.0)
            .opt_leaf("opening-receipt", self.opening_receipt.as_ref())
            .opt_record("sms-notification", self.sms_notification.as_ref())
            .opt_record("email-notification", self.email_notification.as_ref())
            .leaf("authentication-level", &self.authentication_level)
            .leaf("sensitivity-level", &self.sensitivity_level)
            .opt_leaf("pre-encrypt", self.pre_encrypt.then_some(&true))
            .opt_leaf("technical-type", self.technical_type.as_ref())
            .opt_record("invoice", self.invoice.as_ref())
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let document = Self {
            uuid: children.leaf("uuid")?,
            subject: children.opt_leaf("subject")?,
            file_type: FileType::new(children.leaf::<String>("file-type")?),
            opening_receipt: children.opt_leaf("opening-receipt")?,
            sms_notification: children.opt_record("sms-notification")?,
            email_notification: children.opt_record("email-notification")?,
            authentication_level: children.leaf("authentication-level")?,
            sensitivity_level: children.leaf("sensitivity-level")?,
            pre_encrypt: children.opt_leaf("pre-encrypt")?.unwrap_or(false),
            technical_type: children.opt_leaf("technical-type")?,
            invoice: children.opt_record("invoice")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(document)
    }
}
