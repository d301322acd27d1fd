#![allow(unsafe_code)]

use core::ptr::{read_volatile, with_exposed_provenance_mut, write_volatile};

use crate::inject::{
    InjectError,
    types::{MappedRegion, PhysicalMemory, REGISTER_WIDTH},
};

/// Physical memory that is directly addressable at its physical address.
///
/// For bare-metal targets without an MMU, or with an identity mapping of the
/// peripheral space. Mapping only validates the range; nothing needs releasing.
#[derive(Debug)]
pub struct DirectMmio {
    _private: (),
}

impl DirectMmio {
    /// # Safety
    /// Every physical address later passed to this backend must be directly
    /// dereferenceable and safe to access with volatile 32-bit reads and writes.
    /// The crate performs no check that an address is a register.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PhysicalMemory for DirectMmio {
    type Region<'a> = DirectRegion<'a>;

    fn map(&self, phys: u64, len: u64) -> Result<DirectRegion<'_>, InjectError> {
        let base = usize::try_from(phys).map_err(|_| InjectError::MapFailed)?;
        let len = usize::try_from(len).map_err(|_| InjectError::MapFailed)?;
        if base == 0 || base % REGISTER_WIDTH as usize != 0 {
            return Err(InjectError::MapFailed);
        }
        base.checked_add(len).ok_or(InjectError::MapFailed)?;

        Ok(DirectRegion {
            ptr: with_exposed_provenance_mut(base),
            len,
            _memory: core::marker::PhantomData,
        })
    }
}

/// Range handed out by [`DirectMmio`].
#[derive(Debug)]
pub struct DirectRegion<'a> {
    ptr: *mut u8,
    len: usize,
    _memory: core::marker::PhantomData<&'a DirectMmio>,
}

impl DirectRegion<'_> {
    fn word(&self, offset: usize) -> *mut u32 {
        assert!(
            offset
                .checked_add(REGISTER_WIDTH as usize)
                .is_some_and(|end| end <= self.len),
            "access out of mapped range: offset {} len {}",
            offset,
            self.len
        );
        self.ptr.wrapping_add(offset).cast()
    }
}

impl MappedRegion for DirectRegion<'_> {
    fn read_u32(&self, offset: usize) -> u32 {
        // SAFETY: DirectMmio::new requires every mapped address to be accessible
        unsafe { read_volatile(self.word(offset)) }
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        // SAFETY: see read_u32
        unsafe { write_volatile(self.word(offset), value) }
    }
}
