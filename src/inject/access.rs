use crate::inject::{
    InjectError,
    helpers::{read_span, write_span},
    types::{MappedRegion, PhysicalMemory, REGISTER_WIDTH, RegisterRead, WRITE_WINDOW},
};

/// Performs one-shot register reads and writes through a [`PhysicalMemory`] backend.
///
/// Every call maps the range it needs, accesses it and releases the mapping
/// before returning (or, for reads, once the last value has been produced).
/// The accessor holds no state of its own besides the backend and the write
/// window size.
#[derive(Debug)]
pub struct RegisterAccessor<M: PhysicalMemory> {
    memory: M,
    write_window: u64,
}

impl<M: PhysicalMemory> RegisterAccessor<M> {
    pub fn new(memory: M) -> Self {
        Self::with_write_window(memory, WRITE_WINDOW)
    }

    pub fn with_write_window(memory: M, write_window: u64) -> Self {
        Self {
            memory,
            write_window,
        }
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Writes the low 32 bits of `value` to `register`.
    ///
    /// The register is read back once afterwards and the result logged. The
    /// read-back is informational only; a mismatch is not an error.
    pub fn write(&self, register: u64, value: u64) -> Result<(), InjectError> {
        log::info!("reg write: reg={register:#x}, val={value:#x}");

        let len = write_span(register, self.write_window)?;
        let mut region = self.memory.map(register, len).inspect_err(|_| {
            log::error!("register base map failed: reg={register:#x}, len={len:#x}");
        })?;

        region.write_u32(0, value as u32);
        let readback = region.read_u32(0);
        log::info!("reg write: read back reg={register:#x}, val={readback:#x}");

        Ok(())
    }

    /// Reads `count` consecutive 32-bit registers starting at `register`.
    ///
    /// Values are produced lazily in ascending address order. The mapping is
    /// released as soon as the last value is produced, or when the returned
    /// iterator is dropped.
    pub fn read(&self, register: u64, count: u64) -> Result<RegisterReads<'_, M>, InjectError> {
        log::info!("reg read: reg={register:#x}, cnt={count}");

        let len = read_span(register, count)?;
        let region = self.memory.map(register, len).inspect_err(|_| {
            log::error!("register base map failed: reg={register:#x}, len={len:#x}");
        })?;

        Ok(RegisterReads {
            region: Some(region),
            base: register,
            index: 0,
            count,
        })
    }
}

/// Lazy sequence of register values returned by [`RegisterAccessor::read`].
pub struct RegisterReads<'a, M: PhysicalMemory + 'a> {
    region: Option<M::Region<'a>>,
    base: u64,
    index: u64,
    count: u64,
}

impl<'a, M: PhysicalMemory + 'a> RegisterReads<'a, M> {
    /// True while the mapping is still held.
    pub fn is_mapped(&self) -> bool {
        self.region.is_some()
    }
}

impl<'a, M: PhysicalMemory + 'a> core::fmt::Debug for RegisterReads<'a, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterReads")
            .field("base", &self.base)
            .field("index", &self.index)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl<'a, M: PhysicalMemory + 'a> Iterator for RegisterReads<'a, M> {
    type Item = RegisterRead;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            // release the mapping as soon as the sequence is exhausted
            self.region = None;
            return None;
        }

        let region = self.region.as_ref()?;
        let offset = self.index * REGISTER_WIDTH;
        let value = region.read_u32(offset as usize);
        let read = RegisterRead {
            address: self.base + offset,
            value,
        };
        log::info!("{:#x} {:#010x}", read.address, read.value);

        self.index += 1;
        if self.index >= self.count {
            self.region = None;
        }
        Some(read)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.region.is_some() {
            (self.count - self.index) as usize
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}
