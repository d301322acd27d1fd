//! Test support utilities - only compiled in test builds.

use core::cell::{Cell, RefCell};

use heapless::Vec;

use crate::inject::{
    InjectError,
    access::RegisterAccessor,
    autosuspend::AutosuspendTrigger,
    policy::{BestEffortReplay, ReplayAction, ReplayPolicy},
    storage::{DriverSlot, InjectDriver},
    types::{ListSelector, MappedRegion, PhysicalMemory, REGISTER_WIDTH, RegisterEntry},
};

/// Everything the simulated bus observed, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    /// `(phys, len)`
    Map(u64, u64),
    /// base of the released mapping
    Unmap(u64),
    /// `(address, value read)`
    Read(u64, u32),
    /// `(address, value written)`
    Write(u64, u32),
}

pub type OpLog = Vec<BusOp, 128>;

/// In-memory register file implementing [`PhysicalMemory`].
///
/// Unwritten registers read as 0. Mapping a base passed to [`refuse`](Self::refuse)
/// fails with `MapFailed` and is not recorded.
#[derive(Default)]
pub struct SimulatedBus {
    cells: RefCell<Vec<(u64, u32), 64>>,
    ops: RefCell<OpLog>,
    refused: RefCell<Vec<u64, 8>>,
    live: Cell<usize>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse(&self, phys: u64) {
        self.refused.borrow_mut().push(phys).unwrap();
    }

    /// Sets a register without recording an operation.
    pub fn poke(&self, addr: u64, value: u32) {
        let mut cells = self.cells.borrow_mut();
        match cells.iter_mut().find(|(a, _)| *a == addr) {
            Some(cell) => cell.1 = value,
            None => cells.push((addr, value)).unwrap(),
        }
    }

    /// Reads a register without recording an operation.
    pub fn peek(&self, addr: u64) -> Option<u32> {
        self.cells
            .borrow()
            .iter()
            .find(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
    }

    pub fn ops(&self) -> OpLog {
        self.ops.borrow().clone()
    }

    /// Only the write operations, in order.
    pub fn writes(&self) -> OpLog {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, BusOp::Write(..)))
            .copied()
            .collect()
    }

    pub fn live_mappings(&self) -> usize {
        self.live.get()
    }

    fn record(&self, op: BusOp) {
        self.ops.borrow_mut().push(op).unwrap();
    }
}

impl PhysicalMemory for SimulatedBus {
    type Region<'a> = SimRegion<'a>;

    fn map(&self, phys: u64, len: u64) -> Result<SimRegion<'_>, InjectError> {
        if self.refused.borrow().contains(&phys) {
            return Err(InjectError::MapFailed);
        }
        self.record(BusOp::Map(phys, len));
        self.live.set(self.live.get() + 1);
        Ok(SimRegion {
            bus: self,
            base: phys,
            len,
        })
    }
}

pub struct SimRegion<'a> {
    bus: &'a SimulatedBus,
    base: u64,
    len: u64,
}

impl SimRegion<'_> {
    fn address(&self, offset: usize) -> u64 {
        let offset = offset as u64;
        assert!(
            offset + REGISTER_WIDTH <= self.len,
            "access out of mapped range: offset {} len {}",
            offset,
            self.len
        );
        self.base + offset
    }
}

impl MappedRegion for SimRegion<'_> {
    fn read_u32(&self, offset: usize) -> u32 {
        let addr = self.address(offset);
        let value = self.bus.peek(addr).unwrap_or(0);
        self.bus.record(BusOp::Read(addr, value));
        value
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        let addr = self.address(offset);
        self.bus.poke(addr, value);
        self.bus.record(BusOp::Write(addr, value));
    }
}

impl Drop for SimRegion<'_> {
    fn drop(&mut self) {
        self.bus.record(BusOp::Unmap(self.base));
        self.bus.live.set(self.bus.live.get() - 1);
    }
}

/// Asserts every mapping the bus handed out has been released.
pub fn assert_all_unmapped(bus: &SimulatedBus) {
    assert_eq!(bus.live_mappings(), 0);
    let ops = bus.ops();
    let maps = ops.iter().filter(|op| matches!(op, BusOp::Map(..))).count();
    let unmaps = ops.iter().filter(|op| matches!(op, BusOp::Unmap(..))).count();
    assert_eq!(maps, unmaps);
}

/// Autosuspend trigger that counts requests.
#[derive(Debug, Default)]
pub struct CountingAutosuspend {
    pub requests: usize,
}

impl AutosuspendTrigger for CountingAutosuspend {
    fn request_autosuspend(&mut self) {
        self.requests += 1;
    }
}

/// Replay policy that stops at the first failed write.
pub struct AbortOnFailure;

impl ReplayPolicy for AbortOnFailure {
    fn on_write_failed(
        &self,
        _list: ListSelector,
        _index: usize,
        _entry: &RegisterEntry,
        _err: InjectError,
    ) -> ReplayAction {
        ReplayAction::Abort
    }
}

/// Standard test configuration: 20 entries per list, best-effort replay.
pub type TestDriver<'s, 'b> =
    InjectDriver<'s, 20, &'b SimulatedBus, BestEffortReplay, CountingAutosuspend>;

/// Helper to attach a driver over a simulated bus.
pub fn test_driver<'s, 'b>(
    slot: &'s DriverSlot,
    bus: &'b SimulatedBus,
) -> Result<TestDriver<'s, 'b>, InjectError> {
    InjectDriver::attach(
        slot,
        RegisterAccessor::new(bus),
        BestEffortReplay::default(),
        CountingAutosuspend::default(),
    )
}
