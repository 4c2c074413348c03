//! The fixed 16-byte container header.
//!
//! All packing is explicit shift/mask code; native bit-field layouts are
//! not portable and never touch the disk format.

use crate::error::ExeFormatError;

/// `"COLT"` in ASCII.
pub const MAGIC_NUMBER: u32 = 0x434F_4C54;

/// Size of the on-disk header in bytes.
pub const HEADER_SIZE: usize = 16;

/// The language version triple, packed as `[5b major][5b minor][6b patch]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColtVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl ColtVersion {
    /// A version triple.
    ///
    /// # Panics
    ///
    /// Panics if a component exceeds its field (major/minor 31, patch 63).
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        assert!(major < 32, "major version exceeds 5 bits");
        assert!(minor < 32, "minor version exceeds 5 bits");
        assert!(patch < 64, "patch version exceeds 6 bits");
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Pack into the header field.
    pub const fn encode(self) -> u16 {
        ((self.major as u16) << 11) | ((self.minor as u16) << 6) | (self.patch as u16)
    }

    /// Unpack from the header field.
    pub const fn decode(raw: u16) -> Self {
        Self {
            major: (raw >> 11) as u8,
            minor: ((raw >> 6) & 0x1F) as u8,
            patch: (raw & 0x3F) as u8,
        }
    }
}

impl std::fmt::Display for ColtVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A compilation timestamp (minute precision, years 2024 onward).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub year: u16,
    /// Calendar month, 1-12.
    pub month: u8,
    /// Calendar day, 1-31.
    pub day: u8,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

impl Timestamp {
    /// A timestamp.
    ///
    /// # Panics
    ///
    /// Panics on out-of-range fields or a year before 2024.
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        assert!(year >= 2024, "timestamps start at 2024");
        assert!(year - 2023 < 2048, "year exceeds 11 bits past 2023");
        assert!(month >= 1 && month <= 12, "month out of range");
        assert!(day >= 1 && day <= 31, "day out of range");
        assert!(hour < 24, "hour out of range");
        assert!(minute < 60, "minute out of range");
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// Pack into the three header fields.
    ///
    /// `hour_month` is `[4b hour+1][4b month]` on a 12-hour clock;
    /// `minute_am` is `[1b pad][6b minute+1][1b is_am]`; `year_day` is
    /// `[11b year-2023][5b day]`. A zero sub-field means "no date", which
    /// these encodings never produce for a valid timestamp.
    pub const fn encode(self) -> (u8, u8, u16) {
        let hour12 = self.hour % 12;
        let is_am = self.hour < 12;
        let hour_month = ((hour12 + 1) << 4) | (self.month & 0x0F);
        let minute_am = ((self.minute + 1) << 1) | (is_am as u8);
        let year_day = ((self.year - 2023) << 5) | (self.day as u16);
        (hour_month, minute_am, year_day)
    }

    /// Unpack from the three header fields; `None` when any sub-field is
    /// zero ("no date").
    pub const fn decode(hour_month: u8, minute_am: u8, year_day: u16) -> Option<Timestamp> {
        let hour12 = hour_month >> 4;
        let month = hour_month & 0x0F;
        let minute = (minute_am >> 1) & 0x3F;
        let is_am = minute_am & 1 == 1;
        let year = year_day >> 5;
        let day = (year_day & 0x1F) as u8;

        // Any missing sub-field discards the whole date.
        if hour12 == 0 || month == 0 || minute == 0 || year == 0 || day == 0 {
            return None;
        }
        let hour = (hour12 - 1) + if is_am { 0 } else { 12 };
        Some(Timestamp {
            year: year + 2023,
            month,
            day,
            hour,
            minute: minute - 1,
        })
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// The decoded container header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColtiHeader {
    /// Number of sections in the image.
    pub section_count: u16,
    /// The language version the image was compiled for.
    pub version: ColtVersion,
    /// Compilation timestamp, if recorded.
    pub timestamp: Option<Timestamp>,
}

impl ColtiHeader {
    /// A header for `section_count` sections.
    pub fn new(section_count: u16, version: ColtVersion, timestamp: Option<Timestamp>) -> Self {
        Self {
            section_count,
            version,
            timestamp,
        }
    }

    /// Serialize to the 16-byte little-endian wire form.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let (hour_month, minute_am, year_day) = match self.timestamp {
            Some(ts) => ts.encode(),
            None => (0, 0, 0),
        };
        out.extend_from_slice(&self.section_count.to_le_bytes());
        out.extend_from_slice(&self.version.encode().to_le_bytes());
        out.push(hour_month);
        out.push(minute_am);
        out.extend_from_slice(&year_day.to_le_bytes());
        out.extend_from_slice(&MAGIC_NUMBER.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    /// Parse the 16-byte wire form, checking size and magic.
    pub fn parse(bytes: &[u8]) -> Result<ColtiHeader, ExeFormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ExeFormatError::TooSmall { len: bytes.len() });
        }
        let magic = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if magic != MAGIC_NUMBER {
            return Err(ExeFormatError::BadMagic { found: magic });
        }
        let section_count = u16::from_le_bytes([bytes[0], bytes[1]]);
        let version = ColtVersion::decode(u16::from_le_bytes([bytes[2], bytes[3]]));
        let timestamp = Timestamp::decode(
            bytes[4],
            bytes[5],
            u16::from_le_bytes([bytes[6], bytes[7]]),
        );
        Ok(ColtiHeader {
            section_count,
            version,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_roundtrip() {
        for version in [
            ColtVersion::new(0, 0, 0),
            ColtVersion::new(1, 2, 3),
            ColtVersion::new(31, 31, 63),
        ] {
            assert_eq!(ColtVersion::decode(version.encode()), version);
        }
    }

    #[test]
    fn test_version_field_layout() {
        let v = ColtVersion::new(1, 2, 3);
        assert_eq!(v.encode(), (1 << 11) | (2 << 6) | 3);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let stamps = [
            Timestamp::new(2025, 6, 1, 14, 30),
            Timestamp::new(2024, 1, 1, 0, 0),
            Timestamp::new(2024, 12, 31, 23, 59),
            Timestamp::new(2030, 2, 28, 12, 0),
            Timestamp::new(2025, 7, 15, 11, 59),
        ];
        for ts in stamps {
            let (hm, ma, yd) = ts.encode();
            assert_eq!(Timestamp::decode(hm, ma, yd), Some(ts), "{ts}");
        }
    }

    #[test]
    fn test_zero_subfield_means_no_date() {
        let ts = Timestamp::new(2025, 6, 1, 14, 30);
        let (hm, ma, yd) = ts.encode();
        assert_eq!(Timestamp::decode(0, ma, yd), None); // hour nibble zero
        assert_eq!(Timestamp::decode(hm & 0xF0, ma, yd), None); // month zero
        assert_eq!(Timestamp::decode(hm, ma & 1, yd), None); // minute zero
        assert_eq!(Timestamp::decode(hm, ma, 0), None); // year and day zero
        assert_eq!(Timestamp::decode(hm, ma, yd & !0x1F), None); // day zero
    }

    #[test]
    fn test_header_roundtrip() {
        let header = ColtiHeader::new(
            3,
            ColtVersion::new(1, 2, 3),
            Some(Timestamp::new(2025, 6, 1, 14, 30)),
        );
        let mut bytes = Vec::new();
        header.write_to(&mut bytes);
        assert_eq!(bytes.len(), HEADER_SIZE);

        let parsed = ColtiHeader::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.timestamp.unwrap().hour, 14);
        assert_eq!(parsed.timestamp.unwrap().minute, 30);
    }

    #[test]
    fn test_header_without_timestamp() {
        let header = ColtiHeader::new(0, ColtVersion::new(0, 1, 0), None);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(ColtiHeader::parse(&bytes).unwrap().timestamp, None);
    }

    #[test]
    fn test_header_bytes_are_endian_stable() {
        // The wire form is fully specified: these exact bytes, regardless
        // of host endianness.
        let header = ColtiHeader::new(2, ColtVersion::new(1, 0, 0), None);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes);
        assert_eq!(bytes[0..2], [2, 0]); // section count, LE
        assert_eq!(bytes[2..4], (1u16 << 11).to_le_bytes()); // version
        assert_eq!(bytes[8..12], [0x54, 0x4C, 0x4F, 0x43]); // "COLT" LE
        assert_eq!(bytes[12..16], [0, 0, 0, 0]); // reserved
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            ColtiHeader::parse(&[0u8; 4]),
            Err(ExeFormatError::TooSmall { len: 4 })
        );
        let mut bytes = Vec::new();
        ColtiHeader::new(0, ColtVersion::new(0, 0, 1), None).write_to(&mut bytes);
        bytes[8] = 0xFF;
        assert!(matches!(
            ColtiHeader::parse(&bytes),
            Err(ExeFormatError::BadMagic { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "start at 2024")]
    fn test_timestamp_rejects_old_years() {
        let _ = Timestamp::new(2020, 1, 1, 0, 0);
    }

    #[test]
    fn test_noon_and_midnight_hours() {
        for hour in 0..24u8 {
            let ts = Timestamp::new(2025, 3, 3, hour, 5);
            let (hm, ma, yd) = ts.encode();
            assert_eq!(Timestamp::decode(hm, ma, yd).unwrap().hour, hour);
        }
    }
}
