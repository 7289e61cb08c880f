use crate::protocols::error::ProtocolError;

pub(crate) struct DumpReader<'a> {
    dump: &'a [u8],
}

impl<'a> DumpReader<'a> {
    pub(crate) fn new(dump: &'a [u8]) -> Self {
        Self { dump }
    }

    pub(crate) fn require_len(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.dump.len() < needed {
            return Err(ProtocolError::TruncatedDump {
                needed,
                actual: self.dump.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn read_u8(&self, offset: usize) -> Result<u8, ProtocolError> {
        self.dump
            .get(offset)
            .copied()
            .ok_or(ProtocolError::TruncatedDump {
                needed: offset + 1,
                actual: self.dump.len(),
            })
    }

    pub(crate) fn read_u16_le(&self, offset: usize) -> Result<u16, ProtocolError> {
        let bytes = self.read_slice(offset..offset + 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_slice(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<&'a [u8], ProtocolError> {
        self.dump
            .get(range.clone())
            .ok_or(ProtocolError::TruncatedDump {
                needed: range.end,
                actual: self.dump.len(),
            })
    }
}
