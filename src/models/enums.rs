use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Confirmed => "confirmed",
    Pending => "pending",
    Completed => "completed",
    Blocked => "blocked",
    Missed => "missed",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    /// Whether a row with this status occupies its time range for
    /// conflict purposes. Blocked periods occupy exactly like real
    /// appointments; cancelled and finished visits free the slot.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Pending | Self::Blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Confirmed, "confirmed"),
            (AppointmentStatus::Pending, "pending"),
            (AppointmentStatus::Completed, "completed"),
            (AppointmentStatus::Blocked, "blocked"),
            (AppointmentStatus::Missed, "missed"),
            (AppointmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(AppointmentStatus::from_str("tentative").is_err());
    }

    #[test]
    fn occupying_statuses() {
        assert!(AppointmentStatus::Confirmed.occupies_slot());
        assert!(AppointmentStatus::Pending.occupies_slot());
        assert!(AppointmentStatus::Blocked.occupies_slot());
        assert!(!AppointmentStatus::Completed.occupies_slot());
        assert!(!AppointmentStatus::Missed.occupies_slot());
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
    }
}
