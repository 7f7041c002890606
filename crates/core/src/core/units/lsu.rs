//! Load/store unit (LSU) with interleaved banks.
//!
//! 3-stage pipeline: address decode → bank access → response. Data memory is
//! word-addressed and striped across `num_banks` banks: `bank = addr %
//! num_banks`, `bank_addr = addr / num_banks`, each bank holding
//! `bank_capacity` words. The bank-access stage holds its packet for the
//! configured per-bank latency.
//!
//! Sub-word operations act on the low lanes of the addressed word (the
//! memory is word-granular); loads sign- or zero-extend per the operation.
//! Vector variants process their first element only. Out-of-range loads
//! return zero and out-of-range stores drop silently; both are counted, as
//! are back-to-back requests landing on the same bank (bank conflicts —
//! observed, not separately stalled, since at most one request is in flight
//! at a time).

use tracing::trace;

use crate::common::{Cycle, SimError};
use crate::core::pipeline::{Pipeline, StageLogic};
use crate::fabric::packet::{Packet, Payload};
use crate::fabric::port::{Direction, PortId, PortTable};
use crate::fabric::ticker::Ticker;

use super::ops::LsuOp;

/// Word-addressed storage striped across interleaved banks.
#[derive(Debug)]
pub struct Banks {
    num_banks: usize,
    capacity: usize,
    words: Vec<Vec<u32>>,
}

impl Banks {
    /// Creates `num_banks` banks of `capacity` words each, zero-filled.
    pub fn new(num_banks: usize, capacity: usize) -> Self {
        Self {
            num_banks,
            capacity,
            words: vec![vec![0; capacity]; num_banks],
        }
    }

    /// Bank index for a word address.
    pub fn bank_of(&self, addr: u32) -> usize {
        (addr as usize) % self.num_banks
    }

    /// Intra-bank word index for a word address.
    pub fn bank_addr_of(&self, addr: u32) -> usize {
        (addr as usize) / self.num_banks
    }

    /// True when the address falls inside the backing storage.
    pub fn in_range(&self, addr: u32) -> bool {
        self.bank_addr_of(addr) < self.capacity
    }

    /// Reads the word at `addr`, or 0 when out of range.
    pub fn read(&self, addr: u32) -> u32 {
        if self.in_range(addr) {
            self.words[self.bank_of(addr)][self.bank_addr_of(addr)]
        } else {
            0
        }
    }

    /// Writes the word at `addr`; out-of-range writes drop silently.
    pub fn write(&mut self, addr: u32, value: u32) {
        if self.in_range(addr) {
            let bank = self.bank_of(addr);
            let idx = self.bank_addr_of(addr);
            self.words[bank][idx] = value;
        }
    }

    /// Zero-fills every bank.
    pub fn clear(&mut self) {
        for bank in &mut self.words {
            bank.fill(0);
        }
    }
}

/// Per-request working state.
#[derive(Debug, Clone)]
struct AccessState {
    accessed: bool,
    loaded: u32,
}

/// Stage state for the LSU: banks, in-flight access, counters.
#[derive(Debug)]
pub struct LsuLogic {
    /// Backing storage.
    pub banks: Banks,
    state: Option<AccessState>,
    /// Bank targeted by the previous request, for conflict observation.
    last_bank: Option<usize>,
    loads: u64,
    stores: u64,
    bank_conflicts: u64,
    out_of_range: u64,
}

impl LsuLogic {
    fn new(num_banks: usize, capacity: usize) -> Self {
        Self {
            banks: Banks::new(num_banks, capacity),
            state: None,
            last_bank: None,
            loads: 0,
            stores: 0,
            bank_conflicts: 0,
            out_of_range: 0,
        }
    }

    /// True while a request is in flight.
    pub fn busy(&self) -> bool {
        self.state.is_some()
    }

    /// Extracts the loaded value for a load op from the addressed word.
    fn extract(op: LsuOp, word: u32) -> u32 {
        match op {
            LsuOp::Lb => word as u8 as i8 as i32 as u32,
            LsuOp::Lbu => word & 0xFF,
            LsuOp::Lh => word as u16 as i16 as i32 as u32,
            LsuOp::Lhu => word & 0xFFFF,
            _ => word,
        }
    }

    /// Merges store data into the addressed word for a store op.
    fn merge(op: LsuOp, old: u32, data: u32) -> u32 {
        match op {
            LsuOp::Sb => (old & !0xFF) | (data & 0xFF),
            LsuOp::Sh => (old & !0xFFFF) | (data & 0xFFFF),
            _ => data,
        }
    }
}

impl StageLogic<()> for LsuLogic {
    fn admit(&mut self, _: &mut (), input: Option<Packet>, now: Cycle) -> Option<Packet> {
        let packet = input?;
        if let Payload::MemRequest { op, address, .. } = packet.payload {
            let bank = self.banks.bank_of(address);
            // One request in flight at a time, so a conflict cannot overlap
            // in time; back-to-back requests landing on the same bank are
            // what the counter observes.
            if self.last_bank == Some(bank) {
                self.bank_conflicts += 1;
                trace!(target: "scsim::units", "lsu bank {bank} conflict t={now}");
            }
            self.last_bank = Some(bank);
            if !self.banks.in_range(address) {
                self.out_of_range += 1;
            }
            if op.is_load() {
                self.loads += 1;
            } else {
                self.stores += 1;
            }
            self.state = Some(AccessState {
                accessed: false,
                loaded: 0,
            });
        }
        Some(packet)
    }

    fn transform(&mut self, _: &mut (), stage: usize, packet: &mut Packet, _now: Cycle) {
        match stage {
            1 => {
                // The access itself happens once; the latency hold keeps the
                // packet here while the bank "works".
                if let Payload::MemRequest {
                    op, address, data, ..
                } = packet.payload
                    && let Some(state) = self.state.as_mut()
                    && !state.accessed
                {
                    state.accessed = true;
                    if op.is_load() {
                        state.loaded = Self::extract(op, self.banks.read(address));
                    } else {
                        let merged = Self::merge(op, self.banks.read(address), data);
                        self.banks.write(address, merged);
                    }
                }
            }
            2 => {
                if let Payload::MemRequest {
                    op,
                    address,
                    request_id,
                    rd,
                    ..
                } = packet.payload
                    && let Some(state) = self.state.take()
                {
                    packet.payload = Payload::MemResponse {
                        data: state.loaded,
                        address,
                        request_id,
                        rd: if op.is_store() { 0 } else { rd },
                    };
                }
            }
            _ => {}
        }
    }
}

/// The load/store unit: pipeline, banks, ports, tick state.
#[derive(Debug)]
pub struct Lsu {
    /// Unit name.
    pub name: String,
    /// The 3-stage pipeline.
    pub pipe: Pipeline,
    /// Stage state and backing storage.
    pub logic: LsuLogic,
    /// Periodic tick state.
    pub ticker: Ticker,
    /// Request input port.
    pub in_port: PortId,
    /// Response output port.
    pub out_port: PortId,
    /// External stall signal input.
    pub stall_port: PortId,
}

impl Lsu {
    /// Creates the unit, allocating its ports in the arena.
    ///
    /// The bank-access stage (stage 1) gets the per-bank latency as its
    /// residency latency.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for a zero period or zero banks.
    pub fn new(
        name: &str,
        period: Cycle,
        num_banks: usize,
        bank_capacity: usize,
        bank_latency: Cycle,
        ports: &mut PortTable,
    ) -> Result<Self, SimError> {
        if num_banks == 0 {
            return Err(SimError::InvalidConfig(
                "lsu must have at least one bank".into(),
            ));
        }
        let mut pipe = Pipeline::new(period, 3)?;
        pipe.set_stage_latency(1, bank_latency.max(1));
        Ok(Self {
            name: name.to_string(),
            pipe,
            logic: LsuLogic::new(num_banks, bank_capacity),
            ticker: Ticker::new(period),
            in_port: ports.add(name, "in", Direction::In),
            out_port: ports.add(name, "out", Direction::Out),
            stall_port: ports.add(name, "stall", Direction::In),
        })
    }

    /// Loads completed or in flight.
    pub fn loads(&self) -> u64 {
        self.logic.loads
    }

    /// Stores completed or in flight.
    pub fn stores(&self) -> u64 {
        self.logic.stores
    }

    /// Same-bank back-to-back observations.
    pub fn bank_conflicts(&self) -> u64 {
        self.logic.bank_conflicts
    }

    /// Out-of-range accesses observed.
    pub fn out_of_range(&self) -> u64 {
        self.logic.out_of_range
    }

    /// Runs one tick.
    pub fn tick(&mut self, now: Cycle, ports: &mut PortTable) {
        let stalled = ports.signal_level(self.stall_port);
        let in_port = self.in_port;
        let busy = self.logic.busy();
        let drained = {
            let input = || {
                if busy {
                    None
                } else {
                    ports.port_mut(in_port).read()
                }
            };
            self.pipe.advance(&mut self.logic, &mut (), input, stalled, now)
        };
        if let Some(packet) = drained {
            ports.write(self.out_port, packet);
        }
    }

    /// Returns the unit to its post-construction state, zeroing memory.
    pub fn reset(&mut self) {
        self.pipe.reset();
        self.logic.banks.clear();
        self.logic.state = None;
        self.logic.last_bank = None;
        self.logic.loads = 0;
        self.logic.stores = 0;
        self.logic.bank_conflicts = 0;
        self.logic.out_of_range = 0;
        self.ticker.reset();
    }
}
