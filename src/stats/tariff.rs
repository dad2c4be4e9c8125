use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// Lower bound of each tariff-points band, ascending. The last band is open-ended.
pub const TARIFF_BAND_FLOORS: [u32; 14] = [
    1, 48, 64, 80, 96, 112, 128, 144, 160, 176, 192, 208, 224, 240,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TariffBand {
    pub floor: u32,
    pub ceiling: Option<u32>,
}

impl TariffBand {
    pub fn code(&self) -> String {
        format!("T{:03}", self.floor)
    }

    pub fn description(&self) -> String {
        match self.ceiling {
            None => format!("{} or more tariff points", self.floor),
            Some(ceiling) if self.floor == TARIFF_BAND_FLOORS[0] => {
                format!("less than {} tariff points", ceiling + 1)
            }
            Some(ceiling) => format!("between {} and {} tariff points", self.floor, ceiling),
        }
    }
}

#[derive(Debug)]
pub struct TariffClassifier {
    code_pattern: Regex,
}

impl TariffClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            code_pattern: Regex::new(r"^T(\d{3})$")?,
        })
    }

    /// Maps a `Tnnn` code to the band whose floor is the greatest one not above `nnn`.
    /// Codes below the first floor or not of the `Tnnn` shape have no band.
    pub fn classify(&self, code: &str) -> Option<TariffBand> {
        let points = self
            .code_pattern
            .captures(code)?
            .get(1)?
            .as_str()
            .parse::<u32>()
            .ok()?;

        let index = TARIFF_BAND_FLOORS
            .iter()
            .rposition(|floor| *floor <= points)?;

        Some(TariffBand {
            floor: TARIFF_BAND_FLOORS[index],
            ceiling: TARIFF_BAND_FLOORS.get(index + 1).map(|next| next - 1),
        })
    }
}
