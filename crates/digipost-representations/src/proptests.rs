//! Property-based tests for the codec.
//!
//! Every variant of the polymorphic families must survive
//! `deserialize(serialize(x))` unchanged.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use crate::codec::{deserialize, serialize, XmlCodec};
use crate::domain::document::{AuthenticationLevel, Document, FileType, SensitivityLevel};
use crate::domain::events::{
    DocumentEvent, DocumentEventType, DocumentEvents, DocumentMetadata, EventMetadata,
    MoveFilesFromPublicSector,
};
use crate::domain::identification::Identification;
use crate::domain::message::Message;
use crate::domain::print::{NorwegianAddress, PrintAddress, PrintDetails, PrintRecipient};
use crate::domain::recipient::{MessageRecipient, NameAndAddress, RecipientIdentification};
use chrono::{DateTime, FixedOffset, NaiveDate};
use uuid::Uuid;

// ==================== Strategies ====================

fn text() -> impl Strategy<Value = String> + Clone {
    "[a-zA-Z0-9æøåÆØÅ .#@&<>'\"-]{1,24}"
}

fn uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn datetime() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000, -840i32..=840).prop_map(
        |(secs, nanos, offset_minutes)| {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            DateTime::from_timestamp(secs, nanos)
                .unwrap()
                .with_timezone(&offset)
        },
    )
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn name_and_address() -> impl Strategy<Value = NameAndAddress> {
    (
        text(),
        text(),
        option::of(text()),
        "[0-9]{4}",
        text(),
        option::of(date()),
        option::of("[0-9]{8}"),
        option::of(text()),
    )
        .prop_map(
            |(fullname, addressline1, addressline2, postalcode, city, birth_date, phone_number, email_address)| {
                NameAndAddress {
                    fullname,
                    addressline1,
                    addressline2,
                    postalcode,
                    city,
                    birth_date,
                    phone_number,
                    email_address,
                }
            },
        )
}

fn recipient_identification() -> impl Strategy<Value = RecipientIdentification> {
    prop_oneof![
        "[0-9]{11}".prop_map(RecipientIdentification::PersonalIdentificationNumber),
        "[a-z.]{3,12}#[0-9A-Z]{4}".prop_map(RecipientIdentification::DigipostAddress),
        name_and_address().prop_map(RecipientIdentification::NameAndAddress),
        "[0-9]{9}".prop_map(RecipientIdentification::OrganisationNumber),
    ]
}

fn level<T: Copy + std::fmt::Debug + 'static>(all: &'static [T]) -> impl Strategy<Value = T> {
    proptest::sample::select(all)
}

fn move_files() -> impl Strategy<Value = MoveFilesFromPublicSector> {
    (
        option::of(any::<bool>()),
        datetime(),
        option::of(text()),
        option::of(level(SensitivityLevel::ALL)),
        option::of(level(AuthenticationLevel::ALL)),
        option::of(text()),
        option::of(text()),
        option::of(text()),
        vec((uuid(), option::of(text())), 0..4),
    )
        .prop_map(
            |(
                opened,
                delivery_time,
                subject,
                sensitivity_level,
                authentication_level,
                certificate,
                destination_mailbox,
                destination_mailbox_address,
                documents,
            )| MoveFilesFromPublicSector {
                opened,
                delivery_time,
                subject,
                sensitivity_level,
                authentication_level,
                certificate,
                destination_mailbox,
                destination_mailbox_address,
                documents: documents
                    .into_iter()
                    .map(|(uuid, content_type)| DocumentMetadata { uuid, content_type })
                    .collect(),
            },
        )
}

fn event_metadata() -> impl Strategy<Value = EventMetadata> {
    prop_oneof![
        (text(), option::of(text())).prop_map(|(email_address, error_code)| {
            EventMetadata::EmailNotificationFailed {
                email_address,
                error_code,
            }
        }),
        ("[0-9]{8}", option::of(text())).prop_map(|(mobile_number, error_code)| {
            EventMetadata::SmsNotificationFailed {
                mobile_number,
                error_code,
            }
        }),
        text().prop_map(|explanation| EventMetadata::PrintFailed { explanation }),
        datetime().prop_map(|postmark_date| EventMetadata::Postmarked { postmark_date }),
        move_files().prop_map(EventMetadata::MoveFilesFromPublicSector),
    ]
}

fn document_event() -> impl Strategy<Value = DocumentEvent> {
    (
        uuid(),
        level(DocumentEventType::ALL),
        datetime(),
        option::of(datetime()),
        option::of(event_metadata()),
    )
        .prop_map(|(uuid, event_type, created, document_created, metadata)| DocumentEvent {
            uuid,
            event_type,
            created,
            document_created,
            metadata,
        })
}

fn message_recipient() -> impl Strategy<Value = MessageRecipient> {
    let print = (text(), "[0-9]{4}", text()).prop_map(|(name, zip, city)| {
        let recipient = PrintRecipient::new(
            name,
            PrintAddress::Norwegian(NorwegianAddress::new(zip, city)),
        );
        PrintDetails::new(recipient.clone(), recipient)
    });
    prop_oneof![
        (recipient_identification(), option::of(print.clone())).prop_map(
            |(identification, print_fallback)| MessageRecipient::Digital {
                identification,
                print_fallback,
            }
        ),
        print.prop_map(MessageRecipient::PrintOnly),
    ]
}

// ==================== Round-trip Properties ====================

proptest! {
    /// Every recipient identification variant round-trips inside an identification request.
    #[test]
    fn recipient_identification_roundtrip(identification in recipient_identification()) {
        let request = Identification::Recipient(identification);
        let decoded = deserialize::<Identification>(&serialize(&request).unwrap()).unwrap();
        prop_assert_eq!(decoded, request);
    }

    /// Every event metadata variant round-trips, with offsets and fractions intact.
    #[test]
    fn document_events_roundtrip(events in vec(document_event(), 0..5)) {
        let events = DocumentEvents { events, links: Vec::new() };
        let decoded = deserialize::<DocumentEvents>(&serialize(&events).unwrap()).unwrap();
        for (a, b) in decoded.events.iter().zip(events.events.iter()) {
            prop_assert_eq!(a.created.offset(), b.created.offset());
        }
        prop_assert_eq!(decoded, events);
    }

    /// Metadata decodes to the variant its discriminator names.
    #[test]
    fn event_metadata_discriminator(metadata in event_metadata()) {
        let element = metadata.to_xml("metadata");
        prop_assert_eq!(element.attribute("xsi:type"), Some(metadata.type_name()));
        prop_assert_eq!(EventMetadata::from_xml(&element).unwrap(), metadata);
    }

    /// Messages round-trip for every recipient kind, and direct print is
    /// classified by the recipient alone.
    #[test]
    fn message_roundtrip(
        recipient in message_recipient(),
        subject in text(),
        attachment_count in 0u128..4,
    ) {
        let primary = Document::new(Uuid::from_u128(1_000), subject, FileType::pdf());
        let attachments = (0..attachment_count)
            .map(|i| Document::new(Uuid::from_u128(i), format!("att-{i}"), FileType::html()));
        let direct_print = recipient.is_direct_print();
        let message = Message::builder("message-1", primary)
            .recipient(recipient)
            .attachments(attachments)
            .build()
            .unwrap();

        prop_assert_eq!(message.is_direct_print(), direct_print);
        let decoded = deserialize::<Message>(&serialize(&message).unwrap()).unwrap();
        prop_assert_eq!(decoded, message);
    }
}
