use super::error::DecodeError;
use super::PacketFormat;

/// Sequential little-endian reader over a packed telemetry struct.
///
/// The payload length is checked once on construction; reads past the
/// declared length report the same [`DecodeError::LengthMismatch`].
pub struct ForzaReader<'a> {
    payload: &'a [u8],
    offset: usize,
    format: PacketFormat,
    expected: usize,
}

impl<'a> ForzaReader<'a> {
    /// Accept `payload` only if it is exactly `expected` bytes long.
    pub fn exact(
        payload: &'a [u8],
        format: PacketFormat,
        expected: usize,
    ) -> Result<Self, DecodeError> {
        let reader = Self {
            payload,
            offset: 0,
            format,
            expected,
        };
        if payload.len() != expected {
            return Err(reader.mismatch());
        }
        Ok(reader)
    }

    fn mismatch(&self) -> DecodeError {
        DecodeError::LengthMismatch {
            format: self.format,
            expected: self.expected,
            actual: self.payload.len(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.offset + N;
        let bytes = self
            .payload
            .get(self.offset..end)
            .ok_or_else(|| self.mismatch())?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset = end;
        Ok(out)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    pub fn read_f32_le(&mut self) -> Result<f32, DecodeError> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.take::<1>().map(|[b]| b)
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        self.take::<1>().map(i8::from_le_bytes)
    }

    /// Four consecutive f32 in FL, FR, RL, RR order.
    pub fn read_wheels(&mut self) -> Result<[f32; 4], DecodeError> {
        Ok([
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ])
    }
}
