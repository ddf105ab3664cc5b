//! # Hypermedia Links
//!
//! The server drives every workflow through links. A link carries a relation,
//! a target URI and the media type to use when following it.

use crate::codec::{Children, XmlCodec, XmlElement, MEDIA_TYPE};
use crate::domain::errors::RepresentationError;
use std::fmt;
use url::Url;

pub const RELATIONS_BASE: &str = "https://api.digipost.no/relations/";

/// Link relation. Relations the client does not know are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    SelfLink,
    AddContent,
    Send,
    Next,
    Delete,
    GetContent,
    AddData,
    DocumentStatus,
    CreateMessage,
    Search,
    Autocomplete,
    IdentifyRecipient,
    DocumentEvents,
    SenderInformation,
    GetInbox,
    CreateOrActivateUserAccount,
    /// Full relation URI as sent by the server.
    Other(String),
}

impl Relation {
    /// Short name used after [`RELATIONS_BASE`], `None` for [`Relation::Other`].
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Self::SelfLink => "self",
            Self::AddContent => "add-content",
            Self::Send => "send",
            Self::Next => "next",
            Self::Delete => "delete",
            Self::GetContent => "get-content",
            Self::AddData => "add-data",
            Self::DocumentStatus => "document-status",
            Self::CreateMessage => "create-message",
            Self::Search => "search",
            Self::Autocomplete => "autocomplete",
            Self::IdentifyRecipient => "identify-recipient",
            Self::DocumentEvents => "document-events",
            Self::SenderInformation => "sender-information",
            Self::GetInbox => "get-inbox",
            Self::CreateOrActivateUserAccount => "create-or-activate-user-account",
            Self::Other(_) => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "self" => Self::SelfLink,
            "add-content" => Self::AddContent,
            "send" => Self::Send,
            "next" => Self::Next,
            "delete" => Self::Delete,
            "get-content" => Self::GetContent,
            "add-data" => Self::AddData,
            "document-status" => Self::DocumentStatus,
            "create-message" => Self::CreateMessage,
            "search" => Self::Search,
            "autocomplete" => Self::Autocomplete,
            "identify-recipient" => Self::IdentifyRecipient,
            "document-events" => Self::DocumentEvents,
            "sender-information" => Self::SenderInformation,
            "get-inbox" => Self::GetInbox,
            "create-or-activate-user-account" => Self::CreateOrActivateUserAccount,
            _ => return None,
        })
    }

    pub fn to_uri(&self) -> String {
        match (self, self.name()) {
            (Self::Other(uri), _) => uri.clone(),
            (_, Some(name)) => format!("{RELATIONS_BASE}{name}"),
            (_, None) => String::new(),
        }
    }

    /// Accepts the relation with either scheme of the relations base.
    pub fn from_uri(uri: &str) -> Self {
        uri.strip_prefix(RELATIONS_BASE)
            .or_else(|| uri.strip_prefix("http://api.digipost.no/relations/"))
            .and_then(Self::from_name)
            .unwrap_or_else(|| Self::Other(uri.to_string()))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.to_uri()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub relation: Relation,
    pub uri: Url,
    pub media_type: String,
}

impl Link {
    pub fn new(relation: Relation, uri: Url) -> Self {
        Self {
            relation,
            uri,
            media_type: MEDIA_TYPE.to_string(),
        }
    }
}

impl XmlCodec for Link {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("rel", &self.relation.to_uri())
            .attr("uri", &self.uri)
            .attr("media-type", &self.media_type)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let relation: String = element.required_attr("rel")?;
        Children::new(element).finish()?;
        Ok(Self {
            relation: Relation::from_uri(&relation),
            uri: element.required_attr("uri")?,
            media_type: element
                .optional_attr("media-type")?
                .unwrap_or_else(|| MEDIA_TYPE.to_string()),
        })
    }
}

/// Representations that carry hypermedia links.
pub trait Linked {
    fn links(&self) -> &[Link];

    fn link(&self, relation: &Relation) -> Option<&Link> {
        self.links().iter().find(|l| &l.relation == relation)
    }
}
