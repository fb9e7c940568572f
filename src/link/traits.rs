/// Source of decoded symbols
pub trait SymbolSource {
    /// Error type for link operations
    type Error;

    /// Read the next symbol
    ///
    /// Returns `WouldBlock` while no symbol is available.
    fn read_symbol(&mut self) -> nb::Result<u8, Self::Error>;
}
