//! Declarative extraction of structured fields from portal HTML
//!
//! The handshake tokens live in hidden `<input>` fields and the seat counts
//! live in `<span class="status-bold">Label:</span><span>N</span>` pairs.
//! Both are described as small tables here so a layout change only touches
//! this file.

use scraper::{ElementRef, Html, Selector};

use crate::watcher::SectionSnapshot;

pub const SAML_REQUEST_FIELD: &str = "SAMLRequest";
pub const SAML_RESPONSE_FIELD: &str = "SAMLResponse";
pub const SESSION_DATA_KEY_FIELD: &str = "sessionDataKey";

/// Elements holding the seat-count labels
pub const SEAT_LABEL_SELECTOR: &str = "span.status-bold";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatCount {
    EnrollmentSeatsAvailable,
    WaitlistCapacity,
    WaitlistActual,
    WaitlistSeatsAvailable,
}

/// A label whose next sibling element carries the value
#[derive(Debug, Clone, Copy)]
pub struct SeatLabelRule {
    pub label: &'static str,
    pub count: SeatCount,
}

pub const SEAT_LABEL_RULES: [SeatLabelRule; 4] = [
    SeatLabelRule {
        label: "Enrollment Seats Available:",
        count: SeatCount::EnrollmentSeatsAvailable,
    },
    SeatLabelRule {
        label: "Waitlist Seats Available:",
        count: SeatCount::WaitlistSeatsAvailable,
    },
    SeatLabelRule {
        label: "Waitlist Capacity:",
        count: SeatCount::WaitlistCapacity,
    },
    SeatLabelRule {
        label: "Waitlist Actual:",
        count: SeatCount::WaitlistActual,
    },
];

/// Value of the `<input name="{field}">` element, if present and non-empty
pub fn form_field(html: &str, field: &str) -> Option<String> {
    let selector = Selector::parse(&format!("input[name='{}']", field)).ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|input| input.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn sibling_text(element: ElementRef<'_>) -> Option<String> {
    element
        .next_siblings()
        .find_map(ElementRef::wrap)
        .map(|sibling| sibling.text().collect::<String>().trim().to_string())
}

/// Read the four seat counts. Missing or non-numeric values count as zero.
pub fn seat_snapshot(html: &str) -> SectionSnapshot {
    let mut snapshot = SectionSnapshot::default();
    let Ok(selector) = Selector::parse(SEAT_LABEL_SELECTOR) else {
        return snapshot;
    };
    let document = Html::parse_document(html);

    for label in document.select(&selector) {
        let text = label.text().collect::<String>();
        let Some(rule) = SEAT_LABEL_RULES.iter().find(|r| text.contains(r.label)) else {
            continue;
        };
        let value = sibling_text(label)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        match rule.count {
            SeatCount::EnrollmentSeatsAvailable => snapshot.enrollment_seats_available = value,
            SeatCount::WaitlistCapacity => snapshot.waitlist_capacity = value,
            SeatCount::WaitlistActual => snapshot.waitlist_actual = value,
            SeatCount::WaitlistSeatsAvailable => snapshot.waitlist_seats_available = value,
        }
    }

    snapshot
}
