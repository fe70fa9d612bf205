//! Common types used across the dashboard

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Agronomic region used by the yield model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    North,
    East,
    South,
    West,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::North => "North",
            Region::East => "East",
            Region::South => "South",
            Region::West => "West",
        };
        f.write_str(name)
    }
}

macro_rules! indian_states {
    ($($variant:ident => ($name:literal, $region:ident)),+ $(,)?) => {
        /// States and union territories offered by the location picker
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IndianState {
            $($variant),+
        }

        impl IndianState {
            /// Every selectable state, in picker order
            pub const ALL: &'static [IndianState] = &[$(IndianState::$variant),+];

            /// Proper display name, as sent to the prediction endpoint
            pub fn name(&self) -> &'static str {
                match self {
                    $(IndianState::$variant => $name),+
                }
            }

            /// Region the yield model groups this state into
            pub fn region(&self) -> Region {
                match self {
                    $(IndianState::$variant => Region::$region),+
                }
            }
        }
    };
}

indian_states! {
    AndhraPradesh => ("Andhra Pradesh", South),
    ArunachalPradesh => ("Arunachal Pradesh", East),
    Assam => ("Assam", East),
    Bihar => ("Bihar", East),
    Chhattisgarh => ("Chhattisgarh", West),
    Goa => ("Goa", West),
    Gujarat => ("Gujarat", West),
    Haryana => ("Haryana", North),
    HimachalPradesh => ("Himachal Pradesh", North),
    Jharkhand => ("Jharkhand", East),
    Karnataka => ("Karnataka", South),
    Kerala => ("Kerala", South),
    MadhyaPradesh => ("Madhya Pradesh", West),
    Maharashtra => ("Maharashtra", West),
    Manipur => ("Manipur", East),
    Meghalaya => ("Meghalaya", East),
    Mizoram => ("Mizoram", East),
    Nagaland => ("Nagaland", East),
    Odisha => ("Odisha", East),
    Punjab => ("Punjab", North),
    Rajasthan => ("Rajasthan", West),
    Sikkim => ("Sikkim", East),
    TamilNadu => ("Tamil Nadu", South),
    Telangana => ("Telangana", South),
    Tripura => ("Tripura", East),
    UttarPradesh => ("Uttar Pradesh", North),
    Uttarakhand => ("Uttarakhand", North),
    WestBengal => ("West Bengal", East),
    AndamanAndNicobarIslands => ("Andaman and Nicobar Islands", South),
    Chandigarh => ("Chandigarh", North),
    DadraNagarHaveliDamanDiu => ("Dadra and Nagar Haveli and Daman and Diu", West),
    Delhi => ("Delhi", North),
    JammuAndKashmir => ("Jammu and Kashmir", North),
    Ladakh => ("Ladakh", North),
    Lakshadweep => ("Lakshadweep", South),
    Puducherry => ("Puducherry", South),
}

/// Error returned when a state name is not in the picker list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognised Indian state or union territory")]
pub struct UnknownState(pub String);

impl FromStr for IndianState {
    type Err = UnknownState;

    /// Case-insensitive, whitespace-tolerant lookup by name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        IndianState::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownState(wanted.to_string()))
    }
}

impl fmt::Display for IndianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for IndianState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for IndianState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
