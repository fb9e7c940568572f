use embedded_hal::serial::Read;

use super::traits::SymbolSource;

/// Symbols read from an `embedded-hal` serial receiver
///
/// Fits decoders that hand their output over a UART-like interface.
pub struct SerialLink<R> {
    reader: R,
    received: u32,
}

impl<R: Read<u8>> SerialLink<R> {
    /// Wrap a serial reader
    pub fn new(reader: R) -> Self {
        Self { reader, received: 0 }
    }

    /// Number of symbols read so far
    pub fn received(&self) -> u32 {
        self.received
    }

    /// Give back the serial reader
    pub fn release(self) -> R {
        self.reader
    }
}

impl<R: Read<u8>> SymbolSource for SerialLink<R> {
    type Error = R::Error;

    fn read_symbol(&mut self) -> nb::Result<u8, Self::Error> {
        let symbol = self.reader.read()?;
        self.received = self.received.wrapping_add(1);
        Ok(symbol)
    }
}

/// Symbols replayed from a buffer
///
/// Returns `WouldBlock` once the buffer is exhausted.
pub struct SliceLink<'a> {
    symbols: &'a [u8],
    position: usize,
}

impl<'a> SliceLink<'a> {
    /// Replay `symbols` in order
    pub fn new(symbols: &'a [u8]) -> Self {
        Self {
            symbols,
            position: 0,
        }
    }

    /// Symbols not yet read
    pub fn remaining(&self) -> &'a [u8] {
        &self.symbols[self.position..]
    }
}

impl<'a> SymbolSource for SliceLink<'a> {
    type Error = core::convert::Infallible;

    fn read_symbol(&mut self) -> nb::Result<u8, Self::Error> {
        let symbol = *self
            .symbols
            .get(self.position)
            .ok_or(nb::Error::WouldBlock)?;
        self.position += 1;
        Ok(symbol)
    }
}
