//! Building and loading container images.

use coltc_util::bits::align_next;

use crate::error::ExeFormatError;
use crate::header::{ColtVersion, ColtiHeader, Timestamp, HEADER_SIZE};
use crate::opcode::Inst;

/// Longest allowed section name, excluding the NUL terminator.
pub const MAX_SECTION_NAME: usize = 31;

/// A named region of a loaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutableSection<'a> {
    /// The section name.
    pub name: &'a str,
    /// The section content.
    pub data: &'a [u8],
}

/// Accumulates sections and serializes a container image.
///
/// # Examples
///
/// ```
/// use coltc_exe::{ColtVersion, ColtiExecutable, ExecutableBuilder};
///
/// let mut builder = ExecutableBuilder::new(ColtVersion::new(0, 1, 0), None);
/// builder.push_section("code", vec![0u8; 8]).unwrap();
/// let image = builder.build();
///
/// let exe = ColtiExecutable::load(&image).unwrap();
/// assert_eq!(exe.section_count(), 1);
/// assert_eq!(exe.find_section("code").unwrap().data.len(), 8);
/// ```
pub struct ExecutableBuilder {
    version: ColtVersion,
    timestamp: Option<Timestamp>,
    sections: Vec<(String, Vec<u8>)>,
}

impl ExecutableBuilder {
    /// A builder stamping `version` and `timestamp` into the header.
    pub fn new(version: ColtVersion, timestamp: Option<Timestamp>) -> Self {
        Self {
            version,
            timestamp,
            sections: Vec::new(),
        }
    }

    /// Append a section.
    pub fn push_section(
        &mut self,
        name: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<(), ExeFormatError> {
        let name = name.into();
        if name.len() > MAX_SECTION_NAME || name.as_bytes().contains(&0) {
            return Err(ExeFormatError::SectionNameTooLong { name });
        }
        self.sections.push((name, data));
        Ok(())
    }

    /// Append a code section holding an encoded instruction stream.
    pub fn push_code_section(
        &mut self,
        name: impl Into<String>,
        code: &[Inst],
    ) -> Result<(), ExeFormatError> {
        let mut data = Vec::with_capacity(code.len() * 8);
        for inst in code {
            data.extend_from_slice(&inst.encode().to_le_bytes());
        }
        self.push_section(name, data)
    }

    /// Serialize the image.
    pub fn build(&self) -> Vec<u8> {
        let count = self.sections.len();
        assert!(count <= u16::MAX as usize, "too many sections");

        let mut out = Vec::new();
        ColtiHeader::new(count as u16, self.version, self.timestamp).write_to(&mut out);

        // Reserve the offset table; patched as sections are laid out.
        let table_at = out.len();
        out.resize(out.len() + count * 8, 0);

        for (index, (name, data)) in self.sections.iter().enumerate() {
            // Sections start 8-aligned.
            let start = align_next(out.len() as u64, 8);
            out.resize(start as usize, 0);
            out[table_at + index * 8..table_at + index * 8 + 8]
                .copy_from_slice(&start.to_le_bytes());

            // NUL-terminated name, padded so the size field is 8-aligned.
            let name_region = align_next(name.len() as u64 + 1, 8) as usize;
            out.extend_from_slice(name.as_bytes());
            out.resize(start as usize + name_region, 0);

            out.extend_from_slice(&(data.len() as u64).to_le_bytes());
            out.extend_from_slice(data);
        }
        out
    }
}

/// A validated view over a container image.
pub struct ColtiExecutable<'a> {
    bytes: &'a [u8],
    header: ColtiHeader,
    offsets: Vec<u64>,
}

impl<'a> ColtiExecutable<'a> {
    /// Validate and wrap an image.
    ///
    /// Checks the magic number, the header, the offset table and every
    /// section's name and bounds, so the accessors below cannot fail.
    pub fn load(bytes: &'a [u8]) -> Result<ColtiExecutable<'a>, ExeFormatError> {
        let header = ColtiHeader::parse(bytes)?;
        let count = header.section_count;

        let table_end = HEADER_SIZE + count as usize * 8;
        if bytes.len() < table_end {
            return Err(ExeFormatError::TruncatedSectionTable { count });
        }
        let mut offsets = Vec::with_capacity(count as usize);
        for index in 0..count {
            let at = HEADER_SIZE + index as usize * 8;
            let offset = u64::from_le_bytes(bytes[at..at + 8].try_into().expect("8-byte slice"));
            offsets.push(offset);
        }

        let exe = ColtiExecutable {
            bytes,
            header,
            offsets,
        };
        for index in 0..count {
            exe.validate_section(index)?;
        }
        Ok(exe)
    }

    fn validate_section(&self, index: u16) -> Result<(), ExeFormatError> {
        let offset = self.offsets[index as usize];
        if offset as usize >= self.bytes.len() {
            return Err(ExeFormatError::SectionOffsetOutOfRange { index, offset });
        }
        let start = offset as usize;

        // Name: NUL within MAX_SECTION_NAME + 1 bytes, valid UTF-8.
        let name_window = &self.bytes[start..self.bytes.len().min(start + MAX_SECTION_NAME + 1)];
        let name_len = name_window
            .iter()
            .position(|b| *b == 0)
            .ok_or(ExeFormatError::UnterminatedSectionName { index })?;
        std::str::from_utf8(&name_window[..name_len])
            .map_err(|_| ExeFormatError::InvalidSectionName { index })?;

        // Size field and content must fit the image.
        let size_at = start + align_next(name_len as u64 + 1, 8) as usize;
        if self.bytes.len() < size_at + 8 {
            return Err(ExeFormatError::TruncatedSection { index });
        }
        let size =
            u64::from_le_bytes(self.bytes[size_at..size_at + 8].try_into().expect("8-byte slice"));
        let content_end = (size_at + 8) as u64 + size;
        if content_end > self.bytes.len() as u64 {
            return Err(ExeFormatError::TruncatedSection { index });
        }
        Ok(())
    }

    /// The decoded header.
    pub fn header(&self) -> &ColtiHeader {
        &self.header
    }

    /// The language version of the image.
    pub fn version(&self) -> ColtVersion {
        self.header.version
    }

    /// The compilation timestamp, if recorded.
    pub fn compilation_time(&self) -> Option<Timestamp> {
        self.header.timestamp
    }

    /// Number of sections.
    pub fn section_count(&self) -> u16 {
        self.header.section_count
    }

    /// The section offsets, from the start of the image.
    pub fn section_offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Check if an offset points inside the image.
    pub fn is_in_range(&self, offset: u64) -> bool {
        offset < self.bytes.len() as u64
    }

    /// The section at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= section_count()`; bounds inside the image were
    /// validated by `load`.
    pub fn section(&self, index: u16) -> ExecutableSection<'a> {
        let start = self.offsets[index as usize] as usize;
        let name_window = &self.bytes[start..];
        let name_len = name_window
            .iter()
            .position(|b| *b == 0)
            .expect("validated at load");
        let name = std::str::from_utf8(&name_window[..name_len]).expect("validated at load");

        let size_at = start + align_next(name_len as u64 + 1, 8) as usize;
        let size = u64::from_le_bytes(
            self.bytes[size_at..size_at + 8]
                .try_into()
                .expect("8-byte slice"),
        ) as usize;
        ExecutableSection {
            name,
            data: &self.bytes[size_at + 8..size_at + 8 + size],
        }
    }

    /// Find a section by name.
    pub fn find_section(&self, name: &str) -> Option<ExecutableSection<'a>> {
        (0..self.section_count())
            .map(|index| self.section(index))
            .find(|section| section.name == name)
    }

    /// Iterate over all sections.
    pub fn sections(&self) -> impl Iterator<Item = ExecutableSection<'a>> + '_ {
        (0..self.section_count()).map(|index| self.section(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{BinaryTypeInst, BinaryTypeOp};
    use coltc_fold::OperandType;

    fn version() -> ColtVersion {
        ColtVersion::new(1, 2, 3)
    }

    #[test]
    fn test_empty_image_roundtrip() {
        let image = ExecutableBuilder::new(version(), None).build();
        assert_eq!(image.len(), HEADER_SIZE);
        let exe = ColtiExecutable::load(&image).unwrap();
        assert_eq!(exe.section_count(), 0);
        assert_eq!(exe.version(), version());
        assert_eq!(exe.compilation_time(), None);
    }

    #[test]
    fn test_sections_roundtrip() {
        let mut builder =
            ExecutableBuilder::new(version(), Some(Timestamp::new(2025, 6, 1, 14, 30)));
        builder.push_section("code", vec![1, 2, 3, 4, 5]).unwrap();
        builder.push_section("data", vec![9; 16]).unwrap();
        builder.push_section("empty", Vec::new()).unwrap();
        let image = builder.build();

        let exe = ColtiExecutable::load(&image).unwrap();
        assert_eq!(exe.section_count(), 3);
        assert_eq!(exe.section(0).name, "code");
        assert_eq!(exe.section(0).data, &[1, 2, 3, 4, 5]);
        assert_eq!(exe.section(1).name, "data");
        assert_eq!(exe.section(1).data, &[9; 16]);
        assert_eq!(exe.section(2).data, &[] as &[u8]);
        assert_eq!(exe.find_section("data").unwrap().data.len(), 16);
        assert!(exe.find_section("missing").is_none());

        let ts = exe.compilation_time().unwrap();
        assert_eq!((ts.hour, ts.minute), (14, 30));
    }

    #[test]
    fn test_section_offsets_are_aligned_and_in_range() {
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_section("a", vec![1]).unwrap();
        builder.push_section("b", vec![2, 3]).unwrap();
        let image = builder.build();
        let exe = ColtiExecutable::load(&image).unwrap();
        for offset in exe.section_offsets() {
            assert_eq!(offset % 8, 0);
            assert!(exe.is_in_range(*offset));
        }
    }

    #[test]
    fn test_long_names_rejected_by_builder() {
        let mut builder = ExecutableBuilder::new(version(), None);
        assert!(builder.push_section("x".repeat(31), Vec::new()).is_ok());
        assert!(matches!(
            builder.push_section("y".repeat(32), Vec::new()),
            Err(ExeFormatError::SectionNameTooLong { .. })
        ));
        assert!(matches!(
            builder.push_section("nul\0name", Vec::new()),
            Err(ExeFormatError::SectionNameTooLong { .. })
        ));
    }

    #[test]
    fn test_load_rejects_truncated_table() {
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_section("code", vec![1]).unwrap();
        let image = builder.build();
        assert!(matches!(
            ColtiExecutable::load(&image[..HEADER_SIZE + 4]),
            Err(ExeFormatError::TruncatedSectionTable { .. })
        ));
    }

    #[test]
    fn test_load_rejects_out_of_range_offset() {
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_section("code", vec![1]).unwrap();
        let mut image = builder.build();
        image[HEADER_SIZE..HEADER_SIZE + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            ColtiExecutable::load(&image),
            Err(ExeFormatError::SectionOffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_load_rejects_truncated_content() {
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_section("code", vec![1; 32]).unwrap();
        let image = builder.build();
        assert!(matches!(
            ColtiExecutable::load(&image[..image.len() - 8]),
            Err(ExeFormatError::TruncatedSection { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unterminated_name() {
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_section("x".repeat(31), vec![0; 64]).unwrap();
        let mut image = builder.build();
        // Overwrite the NUL terminator region with non-zero bytes.
        let offset = u64::from_le_bytes(
            image[HEADER_SIZE..HEADER_SIZE + 8].try_into().unwrap(),
        ) as usize;
        for b in &mut image[offset..offset + 32] {
            *b = b'x';
        }
        assert!(matches!(
            ColtiExecutable::load(&image),
            Err(ExeFormatError::UnterminatedSectionName { .. })
        ));
    }

    #[test]
    fn test_code_section_roundtrips_through_decode() {
        let program = [
            Inst::UnsignedImm(7),
            Inst::BinaryType(BinaryTypeInst {
                op: BinaryTypeOp::Add,
                dest: 0,
                a: 0,
                b: 1,
                ty: OperandType::I64,
            }),
        ];
        let mut builder = ExecutableBuilder::new(version(), None);
        builder.push_code_section("code", &program).unwrap();
        let image = builder.build();

        let exe = ColtiExecutable::load(&image).unwrap();
        let code = exe.find_section("code").unwrap();
        let decoded: Vec<_> = code
            .data
            .chunks_exact(8)
            .map(|chunk| Inst::decode(u64::from_le_bytes(chunk.try_into().unwrap())).unwrap())
            .collect();
        assert_eq!(decoded, program);
    }
}
