use crate::protocols::error::ProtocolError;

pub(crate) struct DumpWriter<'a> {
    dump: &'a mut [u8],
}

impl<'a> DumpWriter<'a> {
    pub(crate) fn new(dump: &'a mut [u8]) -> Self {
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

    pub(crate) fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), ProtocolError> {
        self.write_slice(offset, &[value])
    }

    pub(crate) fn write_slice(&mut self, offset: usize, bytes: &[u8]) -> Result<(), ProtocolError> {
        let actual = self.dump.len();
        let end = offset + bytes.len();
        let target = self
            .dump
            .get_mut(offset..end)
            .ok_or(ProtocolError::TruncatedDump {
                needed: end,
                actual,
            })?;
        target.copy_from_slice(bytes);
        Ok(())
    }
}
