//! Parses the date and revision out of a daily grid file name.
//!
//! Archive files are named `<product-prefix>.<YYYYMMDD>[_preliminary].nc`,
//! e.g. `oisst-avhrr-v02r01.20230615_preliminary.nc`.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

pub const GRID_SUFFIX: &str = ".nc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Publication state of one observation date.
pub enum Revision {
    Preliminary,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    pub date: NaiveDate,
    pub revision: Revision,
}

impl FileName {
    /// Returns `None` for anything not following the archive's naming grammar.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = pattern().captures(file_name)?;
        let date = NaiveDate::parse_from_str(&caps["date"], "%Y%m%d").ok()?;
        let revision = if caps.name("prelim").is_some() {
            Revision::Preliminary
        } else {
            Revision::Final
        };

        Some(FileName {
            date,
            revision,
        })
    }
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.+\.(?P<date>\d{8})(?P<prelim>_preliminary)?\.nc$")
            .expect("file name pattern is valid")
    })
}

pub fn is_grid_file(name: &str) -> bool {
    name.ends_with(GRID_SUFFIX)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_final_file() {
        let f = FileName::parse("oisst-avhrr-v02r01.20230615.nc").unwrap();

        assert_eq!(f.date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
        assert_eq!(f.revision, Revision::Final);
    }

    #[test]
    fn should_parse_preliminary_file() {
        let f = FileName::parse("oisst-avhrr-v02r01.20230615_preliminary.nc").unwrap();

        assert_eq!(f.revision, Revision::Preliminary);
        assert_eq!(f.date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
    }

    #[test]
    fn should_reject_unrecognized_names() {
        assert!(FileName::parse("README.txt").is_none());
        assert!(FileName::parse("oisst.2023061.nc").is_none());
        assert!(FileName::parse("oisst.20231345.nc").is_none());
        assert!(FileName::parse("oisst.20230615_draft.nc").is_none());
        assert!(FileName::parse(".20230615.nc").is_none());
    }

    #[test]
    fn should_recognise_grid_suffix() {
        assert!(is_grid_file("a.20230101.nc"));
        assert!(!is_grid_file("a.20230101.nc.md5"));
    }
}
