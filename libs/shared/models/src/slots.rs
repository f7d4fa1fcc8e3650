/// The bookable time slots, in booking order. Every part of the platform
/// that talks about a slot (schedules, availability, bookings, chat agents)
/// uses these exact strings.
pub const SLOT_CATALOG: [&str; 6] = [
    "09:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "14:00-15:00",
    "15:00-16:00",
    "16:00-17:00",
];

pub fn is_catalog_slot(slot: &str) -> bool {
    SLOT_CATALOG.contains(&slot)
}
