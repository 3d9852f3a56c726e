use std::fmt::{Display, Formatter};
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    Soft,
    Hard,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Soft => "soft",
            CoverType::Hard => "hard",
        }
    }
}

impl Display for CoverType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverType {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soft" => Ok(CoverType::Soft),
            "hard" => Ok(CoverType::Hard),
            other => Err(Report::new(KernelError::InvalidArgument)
                .attach_printable(format!("Unknown cover type: {other}"))),
        }
    }
}
