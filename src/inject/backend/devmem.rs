#![allow(unsafe_code)]

use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::io::AsRawFd,
    path::Path,
};

use crate::inject::{
    InjectError,
    types::{MappedRegion, PhysicalMemory, REGISTER_WIDTH},
};

/// Linux userspace backend mapping physical memory through `/dev/mem`.
///
/// Each [`map`](PhysicalMemory::map) call creates a fresh `mmap` of the
/// page-aligned range, released with `munmap` when the region drops.
#[derive(Debug)]
pub struct DevMem {
    file: File,
    page_size: u64,
}

impl DevMem {
    /// Opens `/dev/mem` for reading and writing.
    pub fn open() -> io::Result<Self> {
        Self::open_path("/dev/mem")
    }

    /// Opens a `/dev/mem`-like device node at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            file,
            page_size: page_size as u64,
        })
    }
}

impl PhysicalMemory for DevMem {
    type Region<'a> = DevMemRegion<'a>;

    fn map(&self, phys: u64, len: u64) -> Result<DevMemRegion<'_>, InjectError> {
        let page_offset = phys % self.page_size;
        let map_base = phys - page_offset;
        // mmap rejects zero-length mappings; a degenerate read still maps one page
        let map_size =
            usize::try_from((len + page_offset).max(1)).map_err(|_| InjectError::MapFailed)?;
        let map_offset = libc::off_t::try_from(map_base).map_err(|_| InjectError::MapFailed)?;

        let map_ptr = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                map_offset,
            )
        };
        if map_ptr == libc::MAP_FAILED {
            log::error!(
                "mmap of {phys:#x}+{len:#x} failed: {}",
                io::Error::last_os_error()
            );
            return Err(InjectError::MapFailed);
        }

        Ok(DevMemRegion {
            map_ptr,
            map_size,
            ptr: unsafe { map_ptr.cast::<u8>().add(page_offset as usize) },
            len: len as usize,
            _memory: core::marker::PhantomData,
        })
    }
}

/// Live `/dev/mem` mapping; unmapped on drop.
#[derive(Debug)]
pub struct DevMemRegion<'a> {
    map_ptr: *mut libc::c_void,
    map_size: usize,
    ptr: *mut u8,
    len: usize,
    _memory: core::marker::PhantomData<&'a DevMem>,
}

impl DevMemRegion<'_> {
    fn word(&self, offset: usize) -> *mut u32 {
        assert!(
            offset
                .checked_add(REGISTER_WIDTH as usize)
                .is_some_and(|end| end <= self.len),
            "access out of mapped range: offset {} len {}",
            offset,
            self.len
        );
        unsafe { self.ptr.add(offset).cast() }
    }
}

impl MappedRegion for DevMemRegion<'_> {
    fn read_u32(&self, offset: usize) -> u32 {
        unsafe { std::ptr::read_volatile(self.word(offset)) }
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        unsafe { std::ptr::write_volatile(self.word(offset), value) }
    }
}

impl Drop for DevMemRegion<'_> {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.map_ptr, self.map_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::FileExt, path::PathBuf};

    use super::*;
    use crate::inject::{RegisterAccessor, RegisterRead};

    /// Zero-filled file standing in for `/dev/mem`; removed on drop.
    struct ScratchMem {
        path: PathBuf,
        file: File,
    }

    impl ScratchMem {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(std::format!(
                "reg-inject-{}-{name}",
                std::process::id()
            ));
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .unwrap();
            file.set_len(0x4_0000).unwrap();
            Self { path, file }
        }

        fn open(&self) -> DevMem {
            DevMem::open_path(&self.path).unwrap()
        }

        fn poke(&self, addr: u64, value: u32) {
            self.file.write_all_at(&value.to_ne_bytes(), addr).unwrap();
        }

        fn peek(&self, addr: u64) -> u32 {
            let mut bytes = [0u8; 4];
            self.file.read_exact_at(&mut bytes, addr).unwrap();
            u32::from_ne_bytes(bytes)
        }
    }

    impl Drop for ScratchMem {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn write_at_page_offset_reaches_backing_file() {
        let scratch = ScratchMem::new("write");
        let accessor = RegisterAccessor::new(scratch.open());

        accessor.write(0x1004, 0xdead_beef).unwrap();

        let values: heapless::Vec<u32, 3> =
            accessor.read(0x1000, 3).unwrap().map(|r| r.value).collect();
        assert_eq!(values.as_slice(), &[0, 0xdead_beef, 0]);
        assert_eq!(scratch.peek(0x1004), 0xdead_beef);
    }

    #[test]
    fn read_spans_page_boundary() {
        let scratch = ScratchMem::new("span");
        let page = scratch.open().page_size;
        let base = 2 * page - 8;
        for i in 0..4u64 {
            scratch.poke(base + 4 * i, 0x100 + i as u32);
        }
        let accessor = RegisterAccessor::new(scratch.open());

        let mut reads = accessor.read(base, 4).unwrap();
        assert_eq!(
            reads.next(),
            Some(RegisterRead {
                address: base,
                value: 0x100
            })
        );
        let rest: heapless::Vec<u32, 3> = reads.map(|r| r.value).collect();
        assert_eq!(rest.as_slice(), &[0x101, 0x102, 0x103]);
    }

    #[test]
    fn zero_count_read_maps_and_yields_nothing() {
        let scratch = ScratchMem::new("empty");
        let accessor = RegisterAccessor::new(scratch.open());

        assert_eq!(accessor.read(0x1ffc, 0).unwrap().count(), 0);
    }

    #[test]
    fn region_offset_is_relative_to_requested_base() {
        let scratch = ScratchMem::new("offset");
        scratch.poke(0x1ffc, 0x55);
        let mem = scratch.open();

        let mut region = mem.map(0x1ff8, 8).unwrap();
        assert_eq!(region.read_u32(4), 0x55);
        region.write_u32(0, 0x66);
        drop(region);

        assert_eq!(scratch.peek(0x1ff8), 0x66);
    }

    #[test]
    #[should_panic(expected = "access out of mapped range")]
    fn access_past_mapped_length_panics() {
        let scratch = ScratchMem::new("bounds");
        let mem = scratch.open();

        let region = mem.map(0x1000, 4).unwrap();
        region.read_u32(4);
    }

    #[test]
    fn open_missing_node_fails() {
        assert!(DevMem::open_path("/nonexistent/reg-inject/mem").is_err());
    }
}
