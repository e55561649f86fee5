use crate::models::meeting::Meeting;

pub const STANDUP_SLOT: &str = "2024-01-01-09:00";

/// The single-slot standup used across the API scenarios
pub fn standup() -> Meeting {
    Meeting::new("Standup").with_slot(STANDUP_SLOT, ["Alice"])
}

/// A meeting spread over two days, keys deliberately out of order
pub fn planning() -> Meeting {
    Meeting::new("Planning")
        .with_slot("2024-12-11-14:00", ["Carol"])
        .with_slot("2024-12-10-15:00", ["Alice", "Bob"])
        .with_slot("2024-12-10-09:00", ["Alice"])
}
