//! Medical area vocabulary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fixed classification tag attached to a note.
///
/// Serialized with its Spanish display label, which is also what the
/// database stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicalArea {
    #[serde(rename = "Medicina General")]
    GeneralMedicine,
    #[serde(rename = "Cardiología")]
    Cardiology,
    #[serde(rename = "Dermatología")]
    Dermatology,
    #[serde(rename = "Gastroenterología")]
    Gastroenterology,
    #[serde(rename = "Neurología")]
    Neurology,
}

impl MedicalArea {
    /// Every area in menu order.
    pub const ALL: [Self; 5] = [
        Self::GeneralMedicine,
        Self::Cardiology,
        Self::Dermatology,
        Self::Gastroenterology,
        Self::Neurology,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralMedicine => "Medicina General",
            Self::Cardiology => "Cardiología",
            Self::Dermatology => "Dermatología",
            Self::Gastroenterology => "Gastroenterología",
            Self::Neurology => "Neurología",
        }
    }
}

impl fmt::Display for MedicalArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MedicalArea {
    type Err = Error;

    /// Accepts the label in any letter case, with or without accents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold_label(s);
        Self::ALL
            .into_iter()
            .find(|area| fold_label(area.label()) == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown medical area: {}", s.trim())))
    }
}

fn fold_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}
